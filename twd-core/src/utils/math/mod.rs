//! Math utilities for the two-wheel drive platform.
//!
//! `folding` turns commanded values into device-native signals, `rotation`
//! turns wrapping encoder counts back into absolute angles.

pub mod folding;
pub mod rotation;
