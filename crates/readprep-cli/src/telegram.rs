//! Minimal Telegram Bot API client: long polling, file download and replies.

use std::time::Duration;

use anyhow::{bail, Context as _};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};

/// Largest file the Bot API lets bots download.
pub const MAX_DOWNLOAD_BYTES: u64 = 20 * 1024 * 1024;

#[derive(Deserialize, Debug)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
    pub document: Option<Document>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Chat {
    pub id: i64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub file_size: Option<u64>,
}

impl Document {
    pub fn is_pdf(&self) -> bool {
        self.mime_type.as_deref() == Some("application/pdf")
    }
}

#[derive(Deserialize, Debug)]
struct File {
    file_path: Option<String>,
}

#[derive(Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

/// Bot API client bound to one bot token.
#[derive(Clone, Debug)]
pub struct BotClient {
    client: Client,
    api_url: String,
    file_url: String,
}

impl BotClient {
    pub fn new(api_base: &str, token: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("build telegram http client")?;
        let base = api_base.trim_end_matches('/');
        Ok(Self {
            client,
            api_url: format!("{}/bot{}", base, token),
            file_url: format!("{}/file/bot{}", base, token),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        request: reqwest::RequestBuilder,
    ) -> anyhow::Result<T> {
        let response = request
            .send()
            .await
            .with_context(|| format!("send telegram {} request", method))?;
        let payload: ApiResponse<T> = response
            .json()
            .await
            .with_context(|| format!("parse telegram {} response", method))?;
        if !payload.ok {
            bail!(
                "telegram {} failed: {}",
                method,
                payload
                    .description
                    .unwrap_or_else(|| "unknown error".to_string())
            );
        }
        payload
            .result
            .with_context(|| format!("telegram {} returned no result", method))
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_url, method)
    }

    /// Long-poll for message updates after `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> anyhow::Result<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: ["message"],
        };
        let request = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(timeout_secs + 10))
            .json(&body);
        self.call("getUpdates", request).await
    }

    /// Download a file by id, refusing anything over [`MAX_DOWNLOAD_BYTES`].
    pub async fn download(&self, file_id: &str) -> anyhow::Result<Vec<u8>> {
        let request = self
            .client
            .post(self.method_url("getFile"))
            .json(&json!({ "file_id": file_id }));
        let file: File = self.call("getFile", request).await?;
        let file_path = file.file_path.context("telegram file has no path")?;

        let response = self
            .client
            .get(format!("{}/{}", self.file_url, file_path))
            .send()
            .await
            .context("download telegram file")?
            .error_for_status()
            .context("download telegram file")?;

        let mut data = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("read telegram file")?;
            data.extend_from_slice(&chunk);
            if data.len() as u64 > MAX_DOWNLOAD_BYTES {
                bail!("file exceeds {} bytes", MAX_DOWNLOAD_BYTES);
            }
        }

        debug!("Downloaded {} ({} bytes)", file_path, data.len());
        Ok(data)
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        let request = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }));
        let _: Message = self.call("sendMessage", request).await?;
        trace!("Sent message to chat {}", chat_id);
        Ok(())
    }

    pub async fn send_document(
        &self,
        chat_id: i64,
        file_name: &str,
        content: Vec<u8>,
        caption: &str,
    ) -> anyhow::Result<()> {
        let part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str("text/html")?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);

        let request = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form);
        let _: Message = self.call("sendDocument", request).await?;
        debug!("Sent {} to chat {}", file_name, chat_id);
        Ok(())
    }
}
