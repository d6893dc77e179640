//! Chat session state and its reducer.
//!
//! # Design
//! - One reducer owns the input box, the loading flag and the transcript so async completions
//!   always apply to the latest state.
//! - Sending is allowed only when not loading and the trimmed input is non-empty.
//! - Entries are component-local; nothing is persisted.

use std::rc::Rc;

use chenguang_api_models::{ChatRequest, ChatResponse, FileUploadResponse};
use uuid::Uuid;
use yew::Reducible;
use yew_router::Routable;

use crate::routes::Route;

/// Browsing context the health check opens in.
pub const HEALTH_CHECK_TARGET: &str = "_blank";

/// URL the health-check button opens.
#[must_use]
pub fn health_check_url() -> String {
    Route::Status.to_path()
}

/// Whether a key press in the text box sends the message.
///
/// Enter that confirms an IME candidate belongs to the composition and does not send.
#[must_use]
pub fn is_send_key(key: &str, is_composing: bool) -> bool {
    key == "Enter" && !is_composing
}

/// Text box contents and in-flight flag.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatInputState {
    /// Current contents of the text box.
    pub text: String,
    /// Whether a chat or upload request is in flight.
    pub is_loading: bool,
}

impl ChatInputState {
    /// Whether the send action is enabled.
    #[must_use]
    pub fn can_send(&self) -> bool {
        !self.is_loading && !self.text.trim().is_empty()
    }
}

/// Who produced a transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Author {
    /// The person typing.
    User,
    /// The companion's reply.
    Assistant,
    /// Client-side notices such as upload results and errors.
    System,
}

impl Author {
    /// CSS modifier for the entry bubble.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::User => "from-user",
            Self::Assistant => "from-assistant",
            Self::System => "from-system",
        }
    }
}

/// One line of the conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptEntry {
    /// Monotonic key within the session.
    pub id: u32,
    /// Producer of the entry.
    pub author: Author,
    /// Text shown in the bubble.
    pub content: String,
    /// Dominant emotion detected for assistant replies, when not neutral.
    pub emotion: Option<String>,
}

/// Actions accepted by [`ChatSession`].
#[derive(Clone, Debug, PartialEq)]
pub enum ChatAction {
    /// The text box changed.
    Edit(String),
    /// Move the input into the transcript and mark the session busy.
    Submit,
    /// A file upload started.
    UploadStarted,
    /// The backend answered a chat message.
    Replied(ChatResponse),
    /// The backend accepted an upload.
    Uploaded(FileUploadResponse),
    /// A chat or upload request failed.
    Failed(String),
}

/// State of one mounted chat interface.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatSession {
    /// Text box state.
    pub input: ChatInputState,
    /// Conversation so far, oldest first.
    pub transcript: Vec<TranscriptEntry>,
    /// Conversation id sent with every request.
    pub conversation_id: String,
    next_id: u32,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }
}

impl ChatSession {
    /// Start an empty session for `conversation_id`.
    #[must_use]
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            input: ChatInputState::default(),
            transcript: Vec::new(),
            conversation_id: conversation_id.into(),
            next_id: 0,
        }
    }

    /// Request to send for the current input, or `None` when sending is disabled.
    #[must_use]
    pub fn outgoing(&self) -> Option<ChatRequest> {
        self.input.can_send().then(|| {
            ChatRequest::new(self.input.text.trim(), self.conversation_id.clone())
        })
    }

    fn push(&mut self, author: Author, content: String, emotion: Option<String>) {
        self.transcript.push(TranscriptEntry {
            id: self.next_id,
            author,
            content,
            emotion,
        });
        self.next_id = self.next_id.wrapping_add(1);
    }

    fn apply(&mut self, action: ChatAction) {
        match action {
            ChatAction::Edit(text) => self.input.text = text,
            ChatAction::Submit => {
                if !self.input.can_send() {
                    return;
                }
                let text = self.input.text.trim().to_string();
                self.input.text.clear();
                self.input.is_loading = true;
                self.push(Author::User, text, None);
            }
            ChatAction::UploadStarted => self.input.is_loading = true,
            ChatAction::Replied(response) => {
                self.input.is_loading = false;
                let emotion = (!response.emotion_analysis.is_neutral())
                    .then(|| response.emotion_analysis.dominant_emotion.clone());
                self.push(Author::Assistant, response.assistant_message, emotion);
            }
            ChatAction::Uploaded(response) => {
                self.input.is_loading = false;
                self.push(Author::System, upload_notice(&response), None);
            }
            ChatAction::Failed(detail) => {
                self.input.is_loading = false;
                self.push(Author::System, detail, None);
            }
        }
    }
}

impl Reducible for ChatSession {
    type Action = ChatAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

/// Transcript text for an upload result.
#[must_use]
pub fn upload_notice(response: &FileUploadResponse) -> String {
    let mut notice = response.message.clone();
    if let Some(name) = &response.file_name {
        notice = format!("{notice} ({name})");
    }
    if let Some(url) = &response.file_url {
        notice = format!("{notice} {url}");
    }
    notice
}
