//! Status page and the health payload viewer.

use gloo::console;
use yew::prelude::*;

use crate::features::health::logic::{initial_text, load_health};
use crate::i18n::{DEFAULT_LOCALE, TranslationBundle};
use crate::services::api::ApiCtx;

#[function_component(HealthStatus)]
pub(crate) fn health_status() -> Html {
    let api_ctx = use_context::<ApiCtx>();
    let text = use_state(initial_text);

    {
        let text = text.clone();
        use_effect_with_deps(
            move |_| {
                if let Some(api_ctx) = api_ctx {
                    let client = api_ctx.client.clone();
                    yew::platform::spawn_local(async move {
                        let loaded =
                            load_health(|| client.fetch_health(), |body| text.set(body)).await;
                        if let Err(err) = loaded {
                            console::error!("health check failed", err.to_string());
                        }
                    });
                }
                || ()
            },
            (),
        );
    }

    html! {
        <pre class="health-payload">{(*text).clone()}</pre>
    }
}

#[function_component(StatusPage)]
pub(crate) fn status_page() -> Html {
    let bundle = use_context::<TranslationBundle>()
        .unwrap_or_else(|| TranslationBundle::new(DEFAULT_LOCALE));

    html! {
        <section class="status-page">
            <h2>{bundle.text("health.title", "🩺 系統健康狀態檢查")}</h2>
            <HealthStatus />
        </section>
    }
}
