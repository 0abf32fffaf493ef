//! Frame sinks.
//!
//! Sinks consume rasterized frames in output order. The render pipeline and the playback
//! session both write through [`sink::FrameSink`].

/// `ffmpeg`-based MP4 output via the system binary.
pub(crate) mod ffmpeg;
/// Numbered PNG files in a directory.
pub(crate) mod png;
/// Sink trait and the in-memory sink.
pub(crate) mod sink;
