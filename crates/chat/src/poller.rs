use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tracing::{debug, info, warn};

use propfair_core::wizard::SessionStore;

use crate::api::{BotApi, Update};
use crate::events::classify_update;
use crate::handlers::{BotHandler, OutboundAction};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Long-poll update loop. One update is fully handled before the next is
/// pulled; transport failures back off and retry, per-event failures are
/// logged and skipped.
pub struct UpdatePoller<S> {
    api: Arc<dyn BotApi>,
    handler: BotHandler<S>,
    poll_timeout_secs: u64,
    reconnect_policy: ReconnectPolicy,
}

impl<S> UpdatePoller<S>
where
    S: SessionStore,
{
    pub fn new(
        api: Arc<dyn BotApi>,
        handler: BotHandler<S>,
        poll_timeout_secs: u64,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { api, handler, poll_timeout_secs, reconnect_policy }
    }

    pub async fn run(&self) -> Result<()> {
        let mut offset = 0i64;
        let mut attempt = 0u32;

        loop {
            let batch = match self.api.get_updates(offset, self.poll_timeout_secs).await {
                Ok(Some(batch)) => {
                    attempt = 0;
                    batch
                }
                Ok(None) => {
                    info!(event_name = "ingress.chat.stream_closed", "update stream ended");
                    return Ok(());
                }
                Err(api_error) => {
                    warn!(
                        attempt,
                        max_retries = self.reconnect_policy.max_retries,
                        error = %api_error,
                        "update poll failed"
                    );

                    if attempt >= self.reconnect_policy.max_retries {
                        warn!(
                            max_retries = self.reconnect_policy.max_retries,
                            "update poll retries exhausted; continuing process without crash"
                        );
                        return Ok(());
                    }

                    let delay = self.reconnect_policy.backoff(attempt);
                    attempt += 1;
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    continue;
                }
            };

            for update in batch {
                offset = offset.max(update.update_id + 1);
                self.process(&update).await;
            }
        }
    }

    async fn process(&self, update: &Update) {
        debug!(
            event_name = "ingress.chat.update_received",
            update_id = update.update_id,
            "received gateway update"
        );

        let event = classify_update(update);
        let actions = self.handler.handle(event).await;

        for action in actions {
            let delivery = match action {
                OutboundAction::Send { chat_id, text, keyboard } => {
                    self.api.send_message(chat_id, &text, keyboard).await
                }
                OutboundAction::Edit { chat_id, message_id, text, keyboard } => {
                    self.api.edit_message(chat_id, message_id, &text, keyboard).await
                }
                OutboundAction::AnswerCallback { callback_id } => {
                    self.api.answer_callback(&callback_id).await
                }
            };

            if let Err(api_error) = delivery {
                warn!(
                    update_id = update.update_id,
                    error = %api_error,
                    "outbound delivery failed; continuing update loop"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use propfair_core::catalog::Catalog;
    use propfair_core::config::StatsConfig;
    use propfair_core::domain::UserId;
    use propfair_core::wizard::{InMemorySessionStore, WizardEngine};
    use propfair_db::InMemorySaleStore;

    use super::{ReconnectPolicy, UpdatePoller};
    use crate::api::{ApiError, BotApi, Chat, Message, Update, User};
    use crate::handlers::BotHandler;
    use crate::keyboard::InlineKeyboardMarkup;

    #[derive(Default)]
    struct ScriptedApi {
        state: Mutex<ScriptedState>,
    }

    #[derive(Default)]
    struct ScriptedState {
        batches: VecDeque<Result<Option<Vec<Update>>, ApiError>>,
        poll_offsets: Vec<i64>,
        sent: Vec<String>,
        edited: Vec<(i64, String)>,
        answered: Vec<String>,
    }

    impl ScriptedApi {
        fn with_batches(batches: Vec<Result<Option<Vec<Update>>, ApiError>>) -> Self {
            Self {
                state: Mutex::new(ScriptedState {
                    batches: batches.into(),
                    ..ScriptedState::default()
                }),
            }
        }

        async fn poll_offsets(&self) -> Vec<i64> {
            self.state.lock().await.poll_offsets.clone()
        }

        async fn sent(&self) -> Vec<String> {
            self.state.lock().await.sent.clone()
        }

        async fn answered(&self) -> Vec<String> {
            self.state.lock().await.answered.clone()
        }
    }

    #[async_trait]
    impl BotApi for ScriptedApi {
        async fn get_updates(
            &self,
            offset: i64,
            _timeout_secs: u64,
        ) -> Result<Option<Vec<Update>>, ApiError> {
            let mut state = self.state.lock().await;
            state.poll_offsets.push(offset);
            state.batches.pop_front().unwrap_or(Ok(None))
        }

        async fn send_message(
            &self,
            _chat_id: i64,
            text: &str,
            _keyboard: Option<InlineKeyboardMarkup>,
        ) -> Result<(), ApiError> {
            self.state.lock().await.sent.push(text.to_string());
            Ok(())
        }

        async fn edit_message(
            &self,
            _chat_id: i64,
            message_id: i64,
            text: &str,
            _keyboard: Option<InlineKeyboardMarkup>,
        ) -> Result<(), ApiError> {
            self.state.lock().await.edited.push((message_id, text.to_string()));
            Ok(())
        }

        async fn answer_callback(&self, callback_id: &str) -> Result<(), ApiError> {
            self.state.lock().await.answered.push(callback_id.to_string());
            Ok(())
        }
    }

    fn command_update(update_id: i64, text: &str) -> Update {
        Update {
            update_id,
            message: Some(Message {
                message_id: update_id * 10,
                from: Some(User { id: 42 }),
                chat: Chat { id: 42 },
                text: Some(text.to_string()),
            }),
            callback_query: None,
        }
    }

    fn poller_over(api: Arc<ScriptedApi>, policy: ReconnectPolicy) -> UpdatePoller<InMemorySessionStore> {
        let store = Arc::new(InMemorySaleStore::new());
        let engine = WizardEngine::new(
            InMemorySessionStore::new(Duration::ZERO),
            store.clone(),
            Catalog::default(),
            UserId(42),
        );
        let handler =
            BotHandler::new(engine, store, StatsConfig { top_agents: 10, top_companies: 5 });
        UpdatePoller::new(api, handler, 1, policy)
    }

    #[tokio::test]
    async fn processes_updates_and_advances_the_offset() {
        let api = Arc::new(ScriptedApi::with_batches(vec![
            Ok(Some(vec![command_update(7, "/help"), command_update(8, "/stats")])),
            Ok(None),
        ]));

        let poller = poller_over(
            api.clone(),
            ReconnectPolicy { max_retries: 0, base_delay_ms: 0, max_delay_ms: 0 },
        );
        poller.run().await.expect("poller exits cleanly");

        assert_eq!(api.poll_offsets().await, vec![0, 9]);
        let sent = api.sent().await;
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("/newsale"));
        assert!(sent[1].contains("Total sales: 0"));
    }

    #[tokio::test]
    async fn recovers_after_a_transport_failure() {
        let api = Arc::new(ScriptedApi::with_batches(vec![
            Err(ApiError::Http("network down".to_string())),
            Ok(Some(vec![command_update(1, "/help")])),
            Ok(None),
        ]));

        let poller = poller_over(
            api.clone(),
            ReconnectPolicy { max_retries: 2, base_delay_ms: 0, max_delay_ms: 0 },
        );
        poller.run().await.expect("poller exits cleanly");

        assert_eq!(api.sent().await.len(), 1);
        assert_eq!(api.poll_offsets().await.len(), 3);
    }

    #[tokio::test]
    async fn exhausts_retries_without_crashing() {
        let api = Arc::new(ScriptedApi::with_batches(vec![
            Err(ApiError::Http("fail-1".to_string())),
            Err(ApiError::Http("fail-2".to_string())),
            Err(ApiError::Http("fail-3".to_string())),
        ]));

        let poller = poller_over(
            api.clone(),
            ReconnectPolicy { max_retries: 2, base_delay_ms: 0, max_delay_ms: 0 },
        );
        poller.run().await.expect("poller degrades gracefully");

        assert_eq!(api.poll_offsets().await.len(), 3);
        assert!(api.sent().await.is_empty());
    }

    #[tokio::test]
    async fn callbacks_are_acknowledged_through_the_loop() {
        let update = Update {
            update_id: 3,
            message: None,
            callback_query: Some(crate::api::CallbackQuery {
                id: "cb-3".to_string(),
                from: User { id: 42 },
                message: Some(Message {
                    message_id: 30,
                    from: None,
                    chat: Chat { id: 42 },
                    text: None,
                }),
                data: Some("stale.action".to_string()),
            }),
        };
        let api = Arc::new(ScriptedApi::with_batches(vec![Ok(Some(vec![update])), Ok(None)]));

        let poller = poller_over(
            api.clone(),
            ReconnectPolicy { max_retries: 0, base_delay_ms: 0, max_delay_ms: 0 },
        );
        poller.run().await.expect("poller exits cleanly");

        assert_eq!(api.answered().await, vec!["cb-3"]);
    }

    #[test]
    fn backoff_is_capped() {
        let policy = ReconnectPolicy { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 };
        assert_eq!(policy.backoff(0).as_millis(), 250);
        assert_eq!(policy.backoff(1).as_millis(), 500);
        assert_eq!(policy.backoff(10).as_millis(), 5_000);
    }
}
