// Copyright (c) 2025 - Cowboy AI, Inc.

//! Boundary adapters
//!
//! Conversions between external wire formats and the typed inventory model.

pub mod sls;

pub use sls::{decode_state, encode_state, SlsHardware, SlsNetwork, SlsState};
