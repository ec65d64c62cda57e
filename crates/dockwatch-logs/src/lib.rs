//! Client-side log buffer and view policy for dockwatch.
//!
//! Consumes the events emitted by the streaming gateway: an append-only
//! buffer with search filtering and export, plus the sticky-bottom
//! autoscroll policy of the log view.

mod buffer;
mod view;

pub use buffer::{BufferedLine, LogBuffer, LogLevel};
pub use view::Autoscroll;
