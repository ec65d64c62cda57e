//! Docker engine access for dockwatch.
//!
//! This crate handles directory queries, log-stream attachment, and
//! decoding of the engine's multiplexed log framing.

mod demux;
mod engine;
mod stream;

pub use demux::{FRAME_HEADER_LEN, demux_chunk, encode_frame};
pub use engine::DockerEngine;
pub use stream::LogStream;
