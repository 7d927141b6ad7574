use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{error::NotifyError, services::channel::NotificationChannel};

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self {
            http: Client::new(),
            token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }

    async fn call(&self, method: &str, body: serde_json::Value) -> Result<(), NotifyError> {
        if self.token.trim().is_empty() {
            return Err(NotifyError::MissingToken);
        }

        let res = self
            .http
            .post(self.method_url(method))
            .json(&body)
            .send()
            .await?;

        let api = res.json::<ApiResponse>().await?;
        if !api.ok {
            return Err(NotifyError::Rejected(
                api.description.unwrap_or_else(|| format!("{method} failed")),
            ));
        }

        Ok(())
    }

    pub async fn delete_webhook(&self) -> Result<(), NotifyError> {
        self.call("deleteWebhook", json!({})).await
    }

    pub async fn set_webhook(&self, url: &str) -> Result<(), NotifyError> {
        self.call("setWebhook", json!({ "url": url })).await
    }
}

#[async_trait]
impl NotificationChannel for TelegramClient {
    async fn send(&self, recipient: &str, text: &str, await_reply: bool) -> Result<(), NotifyError> {
        let mut body = json!({ "chat_id": recipient, "text": text });
        if await_reply {
            body["reply_markup"] = json!({ "force_reply": true, "selective": false });
        }
        self.call("sendMessage", body).await
    }
}
