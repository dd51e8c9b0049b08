//! Media inspection for uploaded clips.
//!
//! This crate provides:
//! - The `MediaInspector` capability and its FFprobe implementation
//! - Parsing of FFprobe JSON output
//! - `StagedMedia`, the owned handle that deletes an upload exactly once

pub mod error;
pub mod probe;
pub mod staged;

pub use error::{MediaError, MediaResult};
pub use probe::{parse_probe_output, FfprobeInspector, MediaInfo, MediaInspector};
pub use staged::StagedMedia;
