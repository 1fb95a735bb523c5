//! Video operations through an external `ffmpeg` process.
//!
//! Sampling a whole video into frames is the main path. Single-frame grabs and
//! transcodes share the same runner and deadline.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use wait_timeout::ChildExt;

use super::sequence::FrameSequence;
use crate::config::VisionConfig;
use crate::error::VisionError;

const FRAME_PATTERN: &str = "frame_%05d.jpg";

/// Parameters for one `ffmpeg` extraction run.
#[derive(Clone, Debug)]
pub struct ExtractConfig {
    /// Executable name or path.
    pub binary: String,
    /// Hard deadline for the whole run.
    pub timeout: Duration,
    /// Sample rate (frames per second).
    pub fps: f64,
    /// Output width; height follows the aspect ratio.
    pub scale: u32,
}

impl ExtractConfig {
    pub fn from_config(config: &VisionConfig) -> Self {
        Self {
            binary: config.ffmpeg.binary.clone(),
            timeout: config.ffmpeg.timeout,
            fps: config.motion.fps,
            scale: config.motion.scale,
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::from_config(&VisionConfig::default())
    }
}

/// Encoder settings for [`FrameExtractor::transcode`].
#[derive(Clone, Debug)]
pub struct TranscodeOptions {
    pub vcodec: String,
    /// Constant rate factor; lower is higher quality.
    pub crf: u8,
    pub preset: String,
}

impl Default for TranscodeOptions {
    fn default() -> Self {
        Self {
            vcodec: "libx264".to_string(),
            crf: 23,
            preset: "medium".to_string(),
        }
    }
}

/// How an `ffmpeg` run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Exited { success: bool },
    TimedOut,
}

/// Runs `ffmpeg` under the configured deadline.
#[derive(Clone, Debug)]
pub struct FrameExtractor {
    config: ExtractConfig,
}

impl FrameExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Sample `video` into a fresh temporary directory.
    ///
    /// Nothing here is fatal to the caller: a missing video, a process that
    /// cannot be started, a failed exit or a timeout are logged, and whatever
    /// frames were written are returned, possibly none.
    pub fn extract(&self, video: &Path) -> Result<FrameSequence> {
        if !video.is_file() {
            let err = VisionError::NotFound {
                path: video.to_path_buf(),
            };
            log::warn!("{}; no frames to track", err);
            return Ok(FrameSequence::empty());
        }

        let dir = tempfile::Builder::new()
            .prefix("vision_frames_")
            .tempdir()
            .context("create frame extraction dir")?;

        match self.run(video, dir.path()) {
            Ok(RunOutcome::Exited { success: true }) => {}
            Ok(RunOutcome::Exited { success: false }) => {
                log::warn!("ffmpeg exited with failure for {}", video.display());
            }
            Ok(RunOutcome::TimedOut) => {
                let err = VisionError::Timeout {
                    after: self.config.timeout,
                };
                log::warn!("{} extracting {}; using partial output", err, video.display());
            }
            Err(err) => {
                log::warn!("{:#}", err);
                return Ok(FrameSequence::empty());
            }
        }

        let sequence = FrameSequence::from_dir(dir)?;
        if sequence.is_empty() {
            let err =
                VisionError::Extraction(format!("no frames produced from {}", video.display()));
            log::warn!("{}", err);
        } else {
            log::info!("extracted {} frames from {}", sequence.len(), video.display());
        }
        Ok(sequence)
    }

    /// Sample `video` into `out_dir` and wait for the process.
    pub fn run(&self, video: &Path, out_dir: &Path) -> Result<RunOutcome> {
        self.execute(self.sample_command(video, out_dir))
    }

    /// Write the frame at `seconds` (clamped to >= 0) to `output`.
    pub fn extract_frame(&self, video: &Path, seconds: f64, output: &Path) -> Result<()> {
        ensure_video(video)?;
        let outcome = self.execute(self.frame_command(video, seconds, output))?;
        self.require_success(outcome, "frame extraction")?;
        log::info!("wrote frame at {}s of {} to {}", seconds, video.display(), output.display());
        Ok(())
    }

    /// Re-encode `video` into `output`, copying the audio stream.
    pub fn transcode(&self, video: &Path, output: &Path, options: &TranscodeOptions) -> Result<()> {
        ensure_video(video)?;
        let outcome = self.execute(self.transcode_command(video, output, options))?;
        self.require_success(outcome, "transcode")?;
        log::info!("transcoded {} to {}", video.display(), output.display());
        Ok(())
    }

    fn execute(&self, mut command: Command) -> Result<RunOutcome> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        log::debug!("running {:?}", command);
        let child = command.spawn().map_err(|err| {
            VisionError::Extraction(format!("failed to start '{}': {}", self.config.binary, err))
        })?;
        wait_with_deadline(child, self.config.timeout)
    }

    fn require_success(&self, outcome: RunOutcome, what: &str) -> Result<()> {
        match outcome {
            RunOutcome::Exited { success: true } => Ok(()),
            RunOutcome::Exited { success: false } => {
                Err(VisionError::Extraction(format!("ffmpeg {} failed", what)).into())
            }
            RunOutcome::TimedOut => Err(VisionError::Timeout {
                after: self.config.timeout,
            }
            .into()),
        }
    }

    fn base_command(&self) -> Command {
        let mut command = Command::new(&self.config.binary);
        command.arg("-y").arg("-nostdin").args(["-loglevel", "error"]);
        command
    }

    fn sample_command(&self, video: &Path, out_dir: &Path) -> Command {
        let mut command = self.base_command();
        command
            .arg("-i")
            .arg(video)
            .arg("-vf")
            .arg(self.filter())
            .arg(output_pattern(out_dir));
        command
    }

    fn frame_command(&self, video: &Path, seconds: f64, output: &Path) -> Command {
        let seconds = if seconds.is_finite() {
            seconds.max(0.0)
        } else {
            0.0
        };
        let mut command = self.base_command();
        command
            .arg("-ss")
            .arg(seconds.to_string())
            .arg("-i")
            .arg(video)
            .args(["-frames:v", "1"])
            .arg(output);
        command
    }

    fn transcode_command(
        &self,
        video: &Path,
        output: &Path,
        options: &TranscodeOptions,
    ) -> Command {
        let mut command = self.base_command();
        command
            .arg("-i")
            .arg(video)
            .arg("-c:v")
            .arg(&options.vcodec)
            .arg("-preset")
            .arg(&options.preset)
            .arg("-crf")
            .arg(options.crf.to_string())
            .args(["-c:a", "copy"])
            .arg(output);
        command
    }

    fn filter(&self) -> String {
        format!("fps={},scale={}:-1", self.config.fps, self.config.scale)
    }
}

impl Default for FrameExtractor {
    fn default() -> Self {
        Self::new(ExtractConfig::default())
    }
}

fn ensure_video(video: &Path) -> Result<()> {
    if video.is_file() {
        Ok(())
    } else {
        Err(VisionError::NotFound {
            path: video.to_path_buf(),
        }
        .into())
    }
}

fn output_pattern(dir: &Path) -> PathBuf {
    dir.join(FRAME_PATTERN)
}

fn wait_with_deadline(mut child: Child, timeout: Duration) -> Result<RunOutcome> {
    if let Some(status) = child.wait_timeout(timeout).context("wait for ffmpeg")? {
        return Ok(RunOutcome::Exited {
            success: status.success(),
        });
    }
    if let Err(err) = child.kill() {
        log::warn!("failed to kill ffmpeg: {}", err);
    }
    child.wait().context("reap ffmpeg")?;
    Ok(RunOutcome::TimedOut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn extractor(binary: &str, timeout: Duration) -> FrameExtractor {
        FrameExtractor::new(ExtractConfig {
            binary: binary.to_string(),
            timeout,
            ..ExtractConfig::default()
        })
    }

    fn args_of(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn filter_uses_fps_and_width() {
        let extractor = FrameExtractor::default();
        assert_eq!(extractor.filter(), "fps=2,scale=320:-1");
    }

    #[test]
    fn sample_command_line_shape() {
        let extractor = FrameExtractor::default();
        let command = extractor.sample_command(Path::new("in.mp4"), Path::new("/tmp/out"));

        assert_eq!(command.get_program(), "ffmpeg");
        assert_eq!(
            args_of(&command),
            vec![
                "-y",
                "-nostdin",
                "-loglevel",
                "error",
                "-i",
                "in.mp4",
                "-vf",
                "fps=2,scale=320:-1",
                "/tmp/out/frame_%05d.jpg",
            ]
        );
    }

    #[test]
    fn frame_command_seeks_and_clamps() {
        let extractor = FrameExtractor::default();
        let command = extractor.frame_command(Path::new("in.mp4"), 2.5, Path::new("still.jpg"));
        assert_eq!(
            args_of(&command)[4..],
            ["-ss", "2.5", "-i", "in.mp4", "-frames:v", "1", "still.jpg"]
        );

        let command = extractor.frame_command(Path::new("in.mp4"), -3.0, Path::new("still.jpg"));
        assert_eq!(args_of(&command)[5], "0");
    }

    #[test]
    fn transcode_command_uses_options() {
        let extractor = FrameExtractor::default();
        let command = extractor.transcode_command(
            Path::new("in.mov"),
            Path::new("out.mp4"),
            &TranscodeOptions::default(),
        );
        assert_eq!(
            args_of(&command)[4..],
            [
                "-i", "in.mov", "-c:v", "libx264", "-preset", "medium", "-crf", "23", "-c:a",
                "copy", "out.mp4"
            ]
        );
    }

    #[test]
    fn missing_video_yields_empty_sequence() {
        let sequence = FrameExtractor::default()
            .extract(Path::new("/definitely/not/here.mp4"))
            .unwrap();
        assert!(sequence.is_empty());
        assert!(sequence.dir().is_none());
    }

    #[test]
    fn missing_video_fails_single_frame_grab() {
        let dir = tempfile::tempdir().unwrap();
        let err = FrameExtractor::default()
            .extract_frame(Path::new("/definitely/not/here.mp4"), 1.0, &dir.path().join("a.jpg"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VisionError>(),
            Some(VisionError::NotFound { .. })
        ));
    }

    #[test]
    fn missing_binary_yields_empty_sequence() {
        let video = tempfile::NamedTempFile::new().unwrap();
        let sequence = extractor("vision-test-no-such-ffmpeg", Duration::from_secs(5))
            .extract(video.path())
            .unwrap();
        assert!(sequence.is_empty());
    }

    #[test]
    fn missing_binary_run_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = extractor("vision-test-no-such-ffmpeg", Duration::from_secs(5))
            .run(Path::new("in.mp4"), dir.path())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VisionError>(),
            Some(VisionError::Extraction(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn slow_process_is_killed_at_deadline() {
        let child = Command::new("sleep")
            .arg("5")
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        let started = Instant::now();
        let outcome = wait_with_deadline(child, Duration::from_millis(200)).unwrap();

        assert_eq!(outcome, RunOutcome::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn quick_process_reports_exit_status() {
        let ok = Command::new("true").spawn().unwrap();
        assert_eq!(
            wait_with_deadline(ok, Duration::from_secs(5)).unwrap(),
            RunOutcome::Exited { success: true }
        );

        let failed = Command::new("false").spawn().unwrap();
        assert_eq!(
            wait_with_deadline(failed, Duration::from_secs(5)).unwrap(),
            RunOutcome::Exited { success: false }
        );
    }
}
