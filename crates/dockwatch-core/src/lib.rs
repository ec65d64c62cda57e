//! Core types and configuration for dockwatch.
//!
//! This crate provides shared data structures, configuration management,
//! error types, and the duplex-channel protocol used across the dockwatch
//! workspace.

mod config;
mod container;
mod error;
mod event;
mod protocol;

pub use config::{Config, parse_allow_list};
pub use container::{ContainerInfo, FilterConfig};
pub use error::{Error, Result};
pub use event::{LogEvent, LogEventKind};
pub use protocol::{ClientMessage, ServerMessage};
