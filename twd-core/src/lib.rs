//! Core drivers and utilities for a two-wheel steer-and-drive platform on no-std embedded targets.
//!
//! For a runnable bench harness, see the `twd-app/mock-mcu` binary.
#![no_std]

pub mod utils;
