//! Request ID middleware for Tower-compatible stacks.
//!
//! # Design
//! - Generate an `x-request-id` when the caller did not send one, then echo it on the response.
//! - The generator runs outside the propagator so freshly minted ids reach the response too.

use http::Request;
use tower::ServiceBuilder;
use tower::layer::util::{Identity, Stack};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Layer stack type returned by [`request_id_layers`].
pub type RequestIdLayers =
    ServiceBuilder<Stack<PropagateRequestIdLayer, Stack<SetRequestIdLayer<MakeRequestUuid>, Identity>>>;

/// Build the set-then-propagate `x-request-id` stack.
#[must_use]
pub fn request_id_layers() -> RequestIdLayers {
    ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
}

/// Read the correlation id from a request, or an empty string when absent.
#[must_use]
pub fn request_id_of<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::{ServiceExt, service_fn};

    #[tokio::test]
    async fn generated_id_is_echoed_on_response() -> Result<(), Box<dyn std::error::Error>> {
        let service = request_id_layers().service(service_fn(|request: Request<()>| async move {
            assert!(!request_id_of(&request).is_empty());
            Ok::<_, Infallible>(http::Response::new(()))
        }));
        let response = service.oneshot(Request::new(())).await?;
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        Ok(())
    }

    #[tokio::test]
    async fn incoming_id_is_preserved() -> Result<(), Box<dyn std::error::Error>> {
        let service = request_id_layers().service(service_fn(|request: Request<()>| async move {
            assert_eq!(request_id_of(&request), "req-42");
            Ok::<_, Infallible>(http::Response::new(()))
        }));
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "req-42")
            .body(())?;
        let response = service.oneshot(request).await?;
        assert_eq!(
            response
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok()),
            Some("req-42")
        );
        Ok(())
    }

    #[test]
    fn missing_header_reads_as_empty() {
        assert_eq!(request_id_of(&Request::new(())), "");
    }
}
