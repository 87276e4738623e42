//! FFprobe duration lookup.

use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe the duration of a local file or remote manifest, in seconds.
///
/// Returns `None` when FFprobe reports no duration (live playlists).
pub async fn probe_duration(program: &str, input: &str, timeout: Duration) -> MediaResult<Option<f64>> {
    let program = check_ffprobe(program)?;

    let probe = Command::new(&program)
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(input)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(timeout, probe)
        .await
        .map_err(|_| MediaError::Timeout(timeout.as_secs()))??;

    if !output.status.success() {
        return Err(MediaError::ProbeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    let duration = parse_duration(&output.stdout)?;
    debug!(input, duration = ?duration, "Probed duration");
    Ok(duration)
}

fn parse_duration(stdout: &[u8]) -> MediaResult<Option<f64>> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;
    Ok(probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok()))
}
