//! broadcast_review — Core library for the broadcast review UI.
//!
//! Region normalization, waveform generation and color assignment live
//! here, along with the session that ties them to audio fetching, uploads
//! and gap designation. The CLI and the web front end consume this crate.

pub mod amplitude;
pub mod audio;
pub mod color;
pub mod config;
pub mod error;
pub mod gap;
pub mod normalizer;
pub mod notices;
pub mod region;
pub mod session;
pub mod timecode;
pub mod upload;
pub mod view;
pub mod waveform;

pub use error::{Result, ReviewError};
