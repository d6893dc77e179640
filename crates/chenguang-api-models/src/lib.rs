#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Chenguang backend API.
//!
//! The web client encodes requests and decodes responses through these types so
//! the contract with the backend lives in one place. Response types are lenient:
//! every field the backend may omit carries a serde default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Path of the backend health endpoint as seen through the dev proxy.
pub const HEALTH_PATH: &str = "/api/health";
/// Path of the chat endpoint.
pub const CHAT_PATH: &str = "/api/chat";
/// Path of the multipart upload endpoint.
pub const UPLOAD_PATH: &str = "/api/upload";
/// Multipart field carrying the uploaded file.
pub const UPLOAD_FILE_FIELD: &str = "file";
/// Multipart field carrying the conversation id.
pub const UPLOAD_CONVERSATION_FIELD: &str = "conversation_id";
/// User identifier sent when the client has no signed-in user.
pub const DEFAULT_USER_ID: &str = "default_user";

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// Text typed by the user.
    pub user_message: String,
    /// Conversation the message belongs to.
    pub conversation_id: String,
    /// Caller identity used for emotional-state tracking.
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

impl ChatRequest {
    /// Build a request for the anonymous default user.
    #[must_use]
    pub fn new(user_message: impl Into<String>, conversation_id: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            conversation_id: conversation_id.into(),
            user_id: default_user_id(),
        }
    }
}

/// Response body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    /// Reply produced by the assistant.
    pub assistant_message: String,
    /// Emotion analysis of the user's message.
    #[serde(default)]
    pub emotion_analysis: EmotionAnalysis,
    /// Conversation echoed back by the backend.
    pub conversation_id: String,
}

/// Emotion analysis attached to a chat reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmotionAnalysis {
    /// Strongest emotion detected.
    #[serde(default = "neutral")]
    pub dominant_emotion: String,
    /// Normalised score per detected emotion.
    #[serde(default)]
    pub emotions: BTreeMap<String, f64>,
    /// Intensity of the dominant emotion.
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    /// Detector confidence in the dominant emotion.
    #[serde(default)]
    pub confidence: f64,
}

impl Default for EmotionAnalysis {
    fn default() -> Self {
        Self {
            dominant_emotion: neutral(),
            emotions: BTreeMap::new(),
            intensity: default_intensity(),
            confidence: 0.0,
        }
    }
}

impl EmotionAnalysis {
    /// Whether the detector found anything beyond the neutral baseline.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.dominant_emotion == "neutral"
    }
}

/// Response body for `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileUploadResponse {
    /// Whether the backend stored the file.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Public URL of the stored file, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Name the file was stored under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Error envelope returned by the backend and by the dev proxy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// Diagnostic message.
    pub detail: String,
}

impl ApiErrorBody {
    /// Wrap a message in the error envelope.
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Untyped health payload; the client never enforces a schema on it.
pub type HealthPayload = serde_json::Value;

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

fn neutral() -> String {
    "neutral".to_string()
}

const fn default_intensity() -> f64 {
    0.5
}
