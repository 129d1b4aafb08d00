//! tickcheck engine crate.
//!
//! This crate owns the host-side pieces a frame-paced application provides:
//! a monotonic clock, frame timing, the fixed-rate tick driver, and logging
//! setup. The test scheduler in `tickcheck` is built on top of it.

pub mod logging;
pub mod tick;
pub mod time;
