//! Parity Lab: host references, wgpu runners and the seed-driven suite that
//! checks device primitives against them.

#[path = "../cpu/mod.rs"]
pub mod cpu;

pub mod case_io;
pub mod device;
pub mod suite;
pub mod wgpu_load_runner;
pub mod wgpu_scan_runner;

pub use device::{DeviceContext, HarnessError};
