//! HTTP client for the backend, reached through the same-origin `/api` prefix.

use std::rc::Rc;

use anyhow::anyhow;
use chenguang_api_models::{
    ApiErrorBody, CHAT_PATH, ChatRequest, ChatResponse, FileUploadResponse, HEALTH_PATH,
    HealthPayload, UPLOAD_CONVERSATION_FIELD, UPLOAD_FILE_FIELD, UPLOAD_PATH,
};
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use web_sys::{File, FormData};

/// Component-tree context holding the one client per app.
#[derive(Clone)]
pub(crate) struct ApiCtx {
    pub(crate) client: Rc<ApiClient>,
}

impl ApiCtx {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Rc::new(ApiClient::new(base_url)),
        }
    }
}

impl PartialEq for ApiCtx {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.client, &other.client)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub(crate) async fn fetch_health(&self) -> anyhow::Result<HealthPayload> {
        let response = Request::get(&self.url(HEALTH_PATH)).send().await?;
        decode(response).await
    }

    pub(crate) async fn send_chat(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        let response = Request::post(&self.url(CHAT_PATH))
            .json(request)?
            .send()
            .await?;
        decode(response).await
    }

    pub(crate) async fn upload_file(
        &self,
        file: &File,
        conversation_id: &str,
    ) -> anyhow::Result<FileUploadResponse> {
        let form = FormData::new().map_err(|err| anyhow!("form-data failed: {err:?}"))?;
        form.append_with_blob_and_filename(UPLOAD_FILE_FIELD, file, &file.name())
            .map_err(|err| anyhow!("form-data file field failed: {err:?}"))?;
        form.append_with_str(UPLOAD_CONVERSATION_FIELD, conversation_id)
            .map_err(|err| anyhow!("form-data conversation field failed: {err:?}"))?;
        let response = Request::post(&self.url(UPLOAD_PATH))
            .body(form)
            .send()
            .await?;
        let outcome: FileUploadResponse = decode(response).await?;
        if outcome.success {
            Ok(outcome)
        } else {
            Err(anyhow!(outcome.message))
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> anyhow::Result<T> {
    if response.ok() {
        return Ok(response.json::<T>().await?);
    }
    let status = response.status();
    match response.json::<ApiErrorBody>().await {
        Ok(body) => Err(anyhow!("HTTP {status}: {}", body.detail)),
        Err(_) => Err(anyhow!("HTTP {status}")),
    }
}
