//! Configuration core of a Wayland status bar
//!
//! Turns a schema-free JSON bar config into typed settings ([`bar::BarConfig`]),
//! tracks the runtime state of the bars built from it ([`bar::BarInstance`])
//! and drives their layer surfaces through [`bar::surface::LayerSurface`].

#![forbid(unsafe_code)]

pub mod bar;
pub mod constants;
#[cfg(feature = "sway")]
pub mod ipc;
pub mod json;
pub mod loader;
pub mod output;
