//! FFmpeg command builder and runner.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input reference (local path or URL)
    input: String,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl Into<String>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.into(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "warning".to_string(),
        }
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Set seek position in whole seconds (input seeking, before -i).
    pub fn seek(self, seconds: u32) -> Self {
        self.input_arg("-ss").input_arg(seconds.to_string())
    }

    /// Limit output duration in whole seconds.
    pub fn duration(self, seconds: u32) -> Self {
        self.output_arg("-t").output_arg(seconds.to_string())
    }

    /// Copy every stream without re-encoding.
    pub fn codec_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Whether an existing output file is overwritten.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.extend(self.input_args.iter().cloned());

        args.push("-i".to_string());
        args.push(self.input.clone());

        args.extend(self.output_args.iter().cloned());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// stdout followed by stderr, lossily decoded
    pub combined: String,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    fn from_output(output: &Output) -> Self {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Self {
            combined,
            exit_code: output.status.code(),
        }
    }
}

/// Runner for FFmpeg commands with timeout and cancellation.
///
/// The child is spawned with `kill_on_drop`, so dropping the future
/// returned by [`FfmpegRunner::run`] (for example because the calling
/// request was abandoned) also terminates the process.
#[derive(Debug, Clone)]
pub struct FfmpegRunner {
    /// Program name or path
    program: String,
    /// Cancellation signal receiver
    cancel_rx: Option<watch::Receiver<bool>>,
    /// Hard limit on process lifetime
    timeout: Option<Duration>,
}

impl Default for FfmpegRunner {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegRunner {
    /// Create a new runner for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            cancel_rx: None,
            timeout: None,
        }
    }

    /// Set cancellation signal.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run an FFmpeg command, capturing its output.
    ///
    /// A non-zero exit is reported as [`MediaError::TranscodeFailed`]
    /// carrying the captured output.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<CommandOutput> {
        let program = check_ffmpeg(&self.program)?;
        let args = cmd.build_args();
        info!(args = ?args, "Running FFmpeg");

        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MediaError::transcode_failed(format!("failed to launch FFmpeg: {}", e), None, None))?;

        let output = self.wait_for_completion(child.wait_with_output()).await?;
        let captured = CommandOutput::from_output(&output);
        debug!(output = captured.combined.as_str(), "FFmpeg output");

        if output.status.success() {
            Ok(captured)
        } else {
            Err(MediaError::transcode_failed(
                "FFmpeg exited with non-zero status",
                Some(captured.combined),
                captured.exit_code,
            ))
        }
    }

    /// Wait for the child with cancellation and timeout.
    ///
    /// Returning early drops `wait`, which owns the child and kills it.
    async fn wait_for_completion<F>(&self, wait: F) -> MediaResult<Output>
    where
        F: Future<Output = std::io::Result<Output>>,
    {
        let timeout = self.timeout;
        let deadline = async move {
            match timeout {
                Some(t) => tokio::time::sleep(t).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = wait => Ok(result?),
            _ = cancelled(self.cancel_rx.clone()) => {
                info!("FFmpeg cancelled, killing process");
                Err(MediaError::Cancelled)
            }
            _ = deadline => {
                let secs = timeout.map(|t| t.as_secs()).unwrap_or_default();
                warn!("FFmpeg timed out after {} seconds, killing process", secs);
                Err(MediaError::Timeout(secs))
            }
        }
    }
}

/// Resolves once the cancellation flag turns true; never resolves without a receiver.
async fn cancelled(rx: Option<watch::Receiver<bool>>) {
    let Some(mut rx) = rx else {
        return std::future::pending().await;
    };

    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender gone without cancelling.
            return std::future::pending().await;
        }
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg(program: &str) -> MediaResult<PathBuf> {
    which::which(program).map_err(|_| MediaError::FfmpegNotFound(program.to_string()))
}

/// Check if FFprobe is available.
pub fn check_ffprobe(program: &str) -> MediaResult<PathBuf> {
    which::which(program).map_err(|_| MediaError::FfprobeNotFound(program.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("https://s3.example.com/video/output_abc.m3u8", "cut-video/abc.mp4")
            .seek(10)
            .duration(15)
            .codec_copy();

        let args = cmd.build_args();
        assert_eq!(
            args,
            vec![
                "-y",
                "-v",
                "warning",
                "-ss",
                "10",
                "-i",
                "https://s3.example.com/video/output_abc.m3u8",
                "-t",
                "15",
                "-c",
                "copy",
                "cut-video/abc.mp4",
            ]
        );
    }

    #[test]
    fn test_command_without_overwrite() {
        let args = FfmpegCommand::new("in.mp4", "out.mp4")
            .overwrite(false)
            .log_level("error")
            .build_args();
        assert_eq!(args[0], "-v");
        assert_eq!(args[1], "error");
    }

    #[test]
    fn test_missing_program() {
        let err = check_ffmpeg("definitely-not-ffmpeg-vsrv").unwrap_err();
        assert!(matches!(err, MediaError::FfmpegNotFound(_)));
    }

    #[tokio::test]
    async fn test_cancelled_resolves_when_flag_set() {
        let (tx, rx) = watch::channel(false);
        let waiter = tokio::spawn(cancelled(Some(rx)));
        tx.send(true).unwrap();
        waiter.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out() {
        let runner = FfmpegRunner::default().with_timeout(Duration::from_secs(5));
        let never = std::future::pending::<std::io::Result<Output>>();

        let err = runner.wait_for_completion(never).await.unwrap_err();
        assert!(matches!(err, MediaError::Timeout(5)));
    }

    #[tokio::test]
    async fn test_wait_cancelled() {
        let (tx, rx) = watch::channel(false);
        let runner = FfmpegRunner::default().with_cancel(rx);
        tx.send(true).unwrap();

        let never = std::future::pending::<std::io::Result<Output>>();
        let err = runner.wait_for_completion(never).await.unwrap_err();
        assert!(matches!(err, MediaError::Cancelled));
    }
}
