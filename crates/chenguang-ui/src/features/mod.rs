//! Feature slices: each owns its state logic and, on wasm, its view.

pub mod chat;
pub mod health;
