//! Shared layout components.

pub(crate) mod not_found;
pub(crate) mod shell;
