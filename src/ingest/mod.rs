//! Frame ingestion from video files.
//!
//! Videos are never decoded in-process. `ffmpeg` samples them into JPEG files
//! in a temporary directory, and a `FrameSequence` decodes those files one at a
//! time. The directory lives exactly as long as the sequence.
//!
//! Single-frame grabs and transcodes go through the same `ffmpeg` runner.

mod extract;
mod sequence;

pub use extract::{ExtractConfig, FrameExtractor, RunOutcome, TranscodeOptions};
pub use sequence::FrameSequence;
