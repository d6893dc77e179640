//! Chat feature slice.
//!
//! # Design
//! - Session state and its reducer live in `state` and are tested natively.
//! - The view wires DOM events and API calls onto reducer actions.

pub mod state;
#[cfg(target_arch = "wasm32")]
pub(crate) mod view;
