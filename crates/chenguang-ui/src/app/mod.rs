//! Root component and DOM bootstrap.

use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::not_found::NotFound;
use crate::components::shell::AppShell;
use crate::features::chat::view::ChatInterface;
use crate::features::health::view::StatusPage;
use crate::i18n::{DEFAULT_LOCALE, LocaleCode, TranslationBundle};
use crate::routes::Route;
use crate::services::api::ApiCtx;

/// Id of the element the app mounts into.
const MOUNT_ELEMENT_ID: &str = "app";

#[function_component(ChenguangApp)]
fn chenguang_app() -> Html {
    let api_ctx = use_memo(|_| ApiCtx::new(""), ());
    let bundle = use_memo(|_| TranslationBundle::new(browser_locale()), ());

    html! {
        <ContextProvider<ApiCtx> context={(*api_ctx).clone()}>
            <ContextProvider<TranslationBundle> context={(*bundle).clone()}>
                <BrowserRouter>
                    <AppShell>
                        <Switch<Route> render={switch} />
                    </AppShell>
                </BrowserRouter>
            </ContextProvider<TranslationBundle>>
        </ContextProvider<ApiCtx>>
    }
}

fn switch(route: Route) -> Html {
    match route {
        Route::Chat => html! { <ChatInterface /> },
        Route::Status => html! { <StatusPage /> },
        Route::NotFound => html! { <NotFound /> },
    }
}

fn browser_locale() -> LocaleCode {
    gloo::utils::window()
        .navigator()
        .language()
        .and_then(|tag| LocaleCode::from_lang_tag(&tag))
        .unwrap_or(DEFAULT_LOCALE)
}

/// Install the panic hook and mount the app at `#app`, or on `<body>` when the anchor is missing.
pub fn run_app() {
    console_error_panic_hook::set_once();
    if let Some(root) = gloo::utils::document().get_element_by_id(MOUNT_ELEMENT_ID) {
        yew::Renderer::<ChenguangApp>::with_root(root).render();
    } else {
        yew::Renderer::<ChenguangApp>::new().render();
    }
}
