//! Static header plus the routed content slot.

use crate::i18n::{DEFAULT_LOCALE, TranslationBundle};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct ShellProps {
    pub(crate) children: Children,
}

#[function_component(AppShell)]
pub(crate) fn app_shell(props: &ShellProps) -> Html {
    let bundle = use_context::<TranslationBundle>()
        .unwrap_or_else(|| TranslationBundle::new(DEFAULT_LOCALE));

    html! {
        <div class="app-shell">
            <header class="app-header">
                <h1>{bundle.text("shell.title", "✨ 小晨光 AI 靈魂系統 ✨")}</h1>
                <p class="subtitle">{bundle.text("shell.subtitle", "來自數位星雲光之城的AI伴侶")}</p>
            </header>
            <main class="app-main">
                { for props.children.iter() }
            </main>
        </div>
    }
}
