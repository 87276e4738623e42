#![deny(unreachable_patterns)]
//! Media validation and FFmpeg-backed clip extraction.
//!
//! This crate provides:
//! - MP4 signature sniffing for uploads
//! - Type-safe FFmpeg command building
//! - A `Transcoder` capability with timeout, cancellation and output capture
//! - Clip extraction from stored HLS manifests

pub mod clip;
pub mod command;
pub mod error;
pub mod probe;
pub mod transcoder;
pub mod validate;

pub use clip::{clip_key, source_manifest_url, ClipArtifact, ClipConfig, ClipExtractor, ClipRange, CLIP_EXTENSION};
pub use command::{check_ffmpeg, check_ffprobe, CommandOutput, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use probe::probe_duration;
pub use transcoder::{FfmpegTranscoder, TranscodeOutput, TranscodeRequest, Transcoder, TranscoderConfig};
pub use validate::{has_ftyp_signature, validate_media};
