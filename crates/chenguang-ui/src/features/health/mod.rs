//! Health feature slice.
//!
//! # Design
//! - One fetch of `/api/health` per mount; no retry and no polling.
//! - The payload is shown verbatim as indented JSON; no schema is enforced.

pub mod logic;
#[cfg(target_arch = "wasm32")]
pub(crate) mod view;
