//! Chat interface view.

use gloo::console;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::features::chat::state::{
    Author, ChatAction, ChatSession, HEALTH_CHECK_TARGET, TranscriptEntry, health_check_url,
    is_send_key,
};
use crate::i18n::{DEFAULT_LOCALE, TranslationBundle};
use crate::services::api::ApiCtx;

#[function_component(ChatInterface)]
pub(crate) fn chat_interface() -> Html {
    let bundle = use_context::<TranslationBundle>()
        .unwrap_or_else(|| TranslationBundle::new(DEFAULT_LOCALE));
    let api_ctx = use_context::<ApiCtx>();
    let session = use_reducer(ChatSession::default);

    let send = {
        let session = session.clone();
        let api_ctx = api_ctx.clone();
        Callback::from(move |()| {
            let Some(request) = session.outgoing() else {
                return;
            };
            let Some(api_ctx) = api_ctx.clone() else {
                return;
            };
            session.dispatch(ChatAction::Submit);
            let dispatcher = session.dispatcher();
            let client = api_ctx.client.clone();
            yew::platform::spawn_local(async move {
                match client.send_chat(&request).await {
                    Ok(response) => dispatcher.dispatch(ChatAction::Replied(response)),
                    Err(err) => dispatcher.dispatch(ChatAction::Failed(err.to_string())),
                }
            });
        })
    };

    let on_input = {
        let session = session.clone();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            session.dispatch(ChatAction::Edit(input.value()));
        })
    };

    let on_keydown = {
        let send = send.clone();
        Callback::from(move |event: KeyboardEvent| {
            if is_send_key(&event.key(), event.is_composing()) {
                event.prevent_default();
                send.emit(());
            }
        })
    };

    let on_click_send = {
        let send = send.clone();
        Callback::from(move |_: MouseEvent| send.emit(()))
    };

    let on_file_change = {
        let session = session.clone();
        Callback::from(move |event: Event| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            input.set_value("");
            let Some(api_ctx) = api_ctx.clone() else {
                return;
            };
            session.dispatch(ChatAction::UploadStarted);
            let dispatcher = session.dispatcher();
            let client = api_ctx.client.clone();
            let conversation_id = session.conversation_id.clone();
            yew::platform::spawn_local(async move {
                match client.upload_file(&file, &conversation_id).await {
                    Ok(response) => dispatcher.dispatch(ChatAction::Uploaded(response)),
                    Err(err) => dispatcher.dispatch(ChatAction::Failed(err.to_string())),
                }
            });
        })
    };

    let on_health_check = Callback::from(|_: MouseEvent| {
        let opened =
            gloo::utils::window().open_with_url_and_target(&health_check_url(), HEALTH_CHECK_TARGET);
        if let Err(err) = opened {
            console::error!("health check window failed to open", err);
        }
    });

    let is_loading = session.input.is_loading;
    let transcript = if session.transcript.is_empty() {
        html! { <p class="muted chat-empty">{bundle.text("chat.empty", "Say hello!")}</p> }
    } else {
        html! {
            <ul class="chat-transcript">
                {for session.transcript.iter().map(|entry| render_entry(&bundle, entry))}
            </ul>
        }
    };

    html! {
        <section class="chat-interface">
            {transcript}
            <div class="chat-controls">
                <input
                    type="text"
                    class="chat-input"
                    placeholder={bundle.text("chat.placeholder", "輸入訊息與小晨光對話...")}
                    value={session.input.text.clone()}
                    disabled={is_loading}
                    oninput={on_input}
                    onkeydown={on_keydown}
                />
                <button class="btn primary" disabled={!session.input.can_send()} onclick={on_click_send}>
                    {if is_loading {
                        bundle.text("chat.sending", "...")
                    } else {
                        bundle.text("chat.send", "發送")
                    }}
                </button>
                <label class="btn file-upload">
                    {bundle.text("chat.upload", "Upload")}
                    <input type="file" hidden={true} disabled={is_loading} onchange={on_file_change} />
                </label>
                <button class="btn ghost" onclick={on_health_check}>
                    {bundle.text("chat.health_check", "健康檢查")}
                </button>
            </div>
        </section>
    }
}

fn render_entry(bundle: &TranslationBundle, entry: &TranscriptEntry) -> Html {
    let speaker = match entry.author {
        Author::User => bundle.text("chat.you", "You"),
        Author::Assistant => bundle.text("chat.assistant", "Chenguang"),
        Author::System => bundle.text("chat.system", "System"),
    };
    html! {
        <li key={entry.id} class={classes!("chat-entry", entry.author.class())}>
            <span class="speaker">{speaker}</span>
            <p class="content">{entry.content.clone()}</p>
            {if let Some(emotion) = &entry.emotion {
                html! {
                    <span class="pill subtle">
                        {format!("{}: {emotion}", bundle.text("chat.emotion", "Emotion"))}
                    </span>
                }
            } else {
                html! {}
            }}
        </li>
    }
}
