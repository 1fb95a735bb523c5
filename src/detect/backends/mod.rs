pub mod heuristic;
pub mod null;

pub use heuristic::HeuristicBackend;
pub use null::NullBackend;
