//! Core types for the poll service: process configuration and the
//! read-only poll view the renderer consumes.
//!
//! Nothing in this crate performs I/O. The chat-platform payloads live in
//! `pollbot-mattermost`, persistence in `pollbot-db`, and the HTTP surface
//! in `pollbot-server`.

pub mod config;
pub mod poll;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use poll::{relative_vote_share, PollSnapshot, PollView};
