//! Workspace placeholder crate.
//!
//! This crate exists to expose a single feature flag that maps to the
//! individual workspace crates (`bridge-traits`, `core-runtime`, `core-audio`).
//! Host applications can depend on `audio-focus-workspace` and enable the
//! `audio` feature without needing to wire each crate individually.

#[cfg(feature = "audio")]
pub use bridge_traits;
#[cfg(feature = "audio")]
pub use core_audio;
#[cfg(feature = "audio")]
pub use core_runtime;
