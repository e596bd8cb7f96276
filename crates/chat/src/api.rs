use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keyboard::InlineKeyboardMarkup;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("gateway request failed: {0}")]
    Http(String),
    #[error("gateway rejected the call: {0}")]
    Rejected(String),
    #[error("gateway response could not be decoded: {0}")]
    Decode(String),
}

/// Gateway port. `None` from `get_updates` means the update stream has
/// ended (only fakes do this; the HTTP client polls forever).
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Option<Vec<Update>>, ApiError>;

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), ApiError>;

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), ApiError>;

    async fn answer_callback(&self, callback_id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct EditMessageRequest<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct AnswerCallbackRequest<'a> {
    callback_query_id: &'a str,
}

/// HTTP client against a Bot-API-compatible gateway.
pub struct HttpBotApi {
    client: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl HttpBotApi {
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token.expose_secret(), method)
    }

    async fn call<T, B>(&self, method: &str, body: &B) -> Result<T, ApiError>
    where
        T: for<'de> Deserialize<'de>,
        B: Serialize + Sync,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|error| ApiError::Http(error.to_string()))?;

        let envelope: ApiEnvelope<T> =
            response.json().await.map_err(|error| ApiError::Decode(error.to_string()))?;

        if !envelope.ok {
            return Err(ApiError::Rejected(
                envelope.description.unwrap_or_else(|| "no description".to_string()),
            ));
        }

        envelope
            .result
            .ok_or_else(|| ApiError::Decode(format!("`{method}` returned ok without a result")))
    }
}

#[async_trait]
impl BotApi for HttpBotApi {
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Option<Vec<Update>>, ApiError> {
        let updates: Vec<Update> =
            self.call("getUpdates", &GetUpdatesRequest { offset, timeout: timeout_secs }).await?;
        Ok(Some(updates))
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .call("sendMessage", &SendMessageRequest { chat_id, text, reply_markup: keyboard })
            .await?;
        Ok(())
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &EditMessageRequest { chat_id, message_id, text, reply_markup: keyboard },
            )
            .await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .call("answerCallbackQuery", &AnswerCallbackRequest { callback_query_id: callback_id })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::{HttpBotApi, Update};

    #[test]
    fn method_url_joins_base_token_and_method() {
        let api =
            HttpBotApi::new("https://gateway.example/", SecretString::from("12345:abc".to_string()));
        assert_eq!(
            api.method_url("getUpdates"),
            "https://gateway.example/bot12345:abc/getUpdates"
        );
    }

    #[test]
    fn update_payload_decodes_messages_and_callbacks() {
        let raw = r#"{
            "update_id": 7,
            "message": {
                "message_id": 100,
                "from": {"id": 42},
                "chat": {"id": 42},
                "text": "/newsale"
            }
        }"#;

        let update: Update = serde_json::from_str(raw).expect("decode update");
        assert_eq!(update.update_id, 7);
        let message = update.message.expect("message");
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("/newsale"));
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn callback_update_decodes_payload_token() {
        let raw = r#"{
            "update_id": 8,
            "callback_query": {
                "id": "cb-1",
                "from": {"id": 42},
                "message": {"message_id": 101, "chat": {"id": 42}},
                "data": "company:InmoPlus"
            }
        }"#;

        let update: Update = serde_json::from_str(raw).expect("decode update");
        let callback = update.callback_query.expect("callback");
        assert_eq!(callback.data.as_deref(), Some("company:InmoPlus"));
        assert_eq!(callback.message.expect("message").message_id, 101);
    }
}
