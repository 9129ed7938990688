//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the audio core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus for focus and volume notifications
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that `core-audio` depends on.
//! It establishes the logging conventions, the fail-fast configuration
//! builder, and the broadcast channel hosts use to observe state changes.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
