//! Companion-planting farm simulation: library crate.
//!
//! The binary crate (`main.rs`) runs a headless autoplay demo. This library
//! exposes every module so that `tests/` integration tests can drive the
//! farm session directly or through the Bevy plugins, without a window.

pub mod shared;
pub mod calendar;
pub mod farming;
pub mod economy;
pub mod session;
pub mod ui;
pub mod save;
pub mod data;
