//! Client-side routes.

use yew_router::prelude::*;

/// Top-level pages reachable through history navigation.
#[derive(Clone, Copy, Routable, PartialEq, Eq, Debug)]
pub enum Route {
    /// Chat with the companion.
    #[at("/")]
    Chat,
    /// Backend health payload.
    #[at("/status")]
    Status,
    /// Any unknown path.
    #[not_found]
    #[at("/404")]
    NotFound,
}
