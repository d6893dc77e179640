use crate::i18n::{DEFAULT_LOCALE, TranslationBundle};
use crate::routes::Route;
use yew::prelude::*;
use yew_router::prelude::Link;

#[function_component(NotFound)]
pub(crate) fn not_found() -> Html {
    let bundle = use_context::<TranslationBundle>()
        .unwrap_or_else(|| TranslationBundle::new(DEFAULT_LOCALE));

    html! {
        <section class="not-found">
            <h2>{bundle.text("not_found.title", "Page not found")}</h2>
            <p class="muted">{bundle.text("not_found.body", "This page does not exist.")}</p>
            <Link<Route> to={Route::Chat} classes={classes!("btn")}>
                {bundle.text("not_found.home", "Back to chat")}
            </Link<Route>>
        </section>
    }
}
