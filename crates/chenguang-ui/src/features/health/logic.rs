//! Health payload helpers.

use chenguang_api_models::HealthPayload;
use serde_json::{Map, Value};

/// Payload shown before the first response arrives.
#[must_use]
pub fn initial_payload() -> HealthPayload {
    Value::Object(Map::new())
}

/// Render a payload as two-space indented JSON, keeping the backend's key order.
#[must_use]
pub fn render_payload(payload: &HealthPayload) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string())
}

/// Text shown before the first response arrives.
#[must_use]
pub fn initial_text() -> String {
    render_payload(&initial_payload())
}

/// Issue one health read and hand the rendered body to `show`.
///
/// The viewer runs this from its mount-only effect, so each mount performs exactly one
/// request. On failure `show` is not called and the previous text stays on screen.
///
/// # Errors
///
/// Returns the error produced by `fetch`.
#[allow(clippy::future_not_send)]
pub async fn load_health<F, Fut, E, S>(fetch: F, show: S) -> Result<(), E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<HealthPayload, E>>,
    S: FnOnce(String),
{
    let payload = fetch().await?;
    show(render_payload(&payload));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    #[test]
    fn initial_payload_renders_as_empty_object() {
        assert_eq!(render_payload(&initial_payload()), "{}");
    }

    #[test]
    fn payload_renders_with_two_space_indent_in_response_order() -> Result<(), serde_json::Error> {
        let payload: Value = serde_json::from_str(
            r#"{"status":"healthy","services":{"openai":true,"supabase":false},"version":"1.0"}"#,
        )?;
        let expected = "{\n  \"status\": \"healthy\",\n  \"services\": {\n    \"openai\": true,\n    \"supabase\": false\n  },\n  \"version\": \"1.0\"\n}";
        assert_eq!(render_payload(&payload), expected);
        Ok(())
    }

    #[tokio::test]
    async fn mount_reads_once_and_shows_pretty_body() -> Result<(), serde_json::Error> {
        let body: Value = serde_json::from_str(r#"{"status":"healthy","database":"ok"}"#)?;
        let calls = Cell::new(0_u32);
        let shown = RefCell::new(initial_text());

        let outcome = load_health(
            || {
                calls.set(calls.get() + 1);
                let body = body.clone();
                async move { Ok::<_, String>(body) }
            },
            |text| *shown.borrow_mut() = text,
        )
        .await;

        assert_eq!(outcome, Ok(()));
        assert_eq!(calls.get(), 1);
        assert_eq!(
            *shown.borrow(),
            "{\n  \"status\": \"healthy\",\n  \"database\": \"ok\"\n}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn failed_read_keeps_previous_text() {
        let shown = RefCell::new(initial_text());
        let outcome = load_health(
            || async { Err::<HealthPayload, _>("HTTP 503".to_string()) },
            |text| *shown.borrow_mut() = text,
        )
        .await;

        assert_eq!(outcome, Err("HTTP 503".to_string()));
        assert_eq!(*shown.borrow(), "{}");
    }

    #[test]
    fn non_object_payloads_render_verbatim() {
        assert_eq!(render_payload(&json!("ok")), "\"ok\"");
        assert_eq!(render_payload(&json!([1, 2])), "[\n  1,\n  2\n]");
    }
}
