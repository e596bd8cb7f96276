use propfair_core::domain::UserId;
use propfair_core::wizard::WizardButton;

use crate::api::Update;
use crate::commands::{parse_command, BotCommand};
use crate::token;

/// Closed set of inbound events the dispatcher handles. Raw gateway
/// updates are adapted here; nothing downstream touches payload strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatEvent {
    Command { user_id: UserId, chat_id: i64, command: BotCommand },
    Text { user_id: UserId, chat_id: i64, text: String },
    Callback { user_id: UserId, chat_id: i64, message_id: i64, callback_id: String, button: Option<WizardButton> },
    Unsupported,
}

pub fn classify_update(update: &Update) -> ChatEvent {
    if let Some(callback) = &update.callback_query {
        let Some(message) = &callback.message else {
            return ChatEvent::Unsupported;
        };
        let button = callback.data.as_deref().and_then(token::parse);
        return ChatEvent::Callback {
            user_id: UserId(callback.from.id),
            chat_id: message.chat.id,
            message_id: message.message_id,
            callback_id: callback.id.clone(),
            button,
        };
    }

    if let Some(message) = &update.message {
        let (Some(from), Some(text)) = (&message.from, &message.text) else {
            return ChatEvent::Unsupported;
        };
        let user_id = UserId(from.id);
        let chat_id = message.chat.id;

        return match parse_command(text) {
            Some(command) => ChatEvent::Command { user_id, chat_id, command },
            None => ChatEvent::Text { user_id, chat_id, text: text.clone() },
        };
    }

    ChatEvent::Unsupported
}

#[cfg(test)]
mod tests {
    use propfair_core::domain::UserId;
    use propfair_core::wizard::WizardButton;

    use super::{classify_update, ChatEvent};
    use crate::api::{CallbackQuery, Chat, Message, Update, User};
    use crate::commands::BotCommand;

    fn message_update(text: &str) -> Update {
        Update {
            update_id: 1,
            message: Some(Message {
                message_id: 10,
                from: Some(User { id: 42 }),
                chat: Chat { id: 42 },
                text: Some(text.to_string()),
            }),
            callback_query: None,
        }
    }

    #[test]
    fn command_messages_classify_as_commands() {
        let event = classify_update(&message_update("/newsale"));
        assert_eq!(
            event,
            ChatEvent::Command {
                user_id: UserId(42),
                chat_id: 42,
                command: BotCommand::NewSale,
            }
        );
    }

    #[test]
    fn plain_messages_classify_as_text() {
        let event = classify_update(&message_update("180,000"));
        assert_eq!(
            event,
            ChatEvent::Text { user_id: UserId(42), chat_id: 42, text: "180,000".to_string() }
        );
    }

    #[test]
    fn callbacks_decode_their_button_token() {
        let update = Update {
            update_id: 2,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "cb-1".to_string(),
                from: User { id: 42 },
                message: Some(Message {
                    message_id: 11,
                    from: None,
                    chat: Chat { id: 42 },
                    text: None,
                }),
                data: Some("district:Surco".to_string()),
            }),
        };

        let event = classify_update(&update);
        assert_eq!(
            event,
            ChatEvent::Callback {
                user_id: UserId(42),
                chat_id: 42,
                message_id: 11,
                callback_id: "cb-1".to_string(),
                button: Some(WizardButton::District("Surco".to_string())),
            }
        );
    }

    #[test]
    fn unknown_callback_payload_decodes_to_no_button() {
        let update = Update {
            update_id: 3,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "cb-2".to_string(),
                from: User { id: 42 },
                message: Some(Message {
                    message_id: 12,
                    from: None,
                    chat: Chat { id: 42 },
                    text: None,
                }),
                data: Some("stale.action".to_string()),
            }),
        };

        let ChatEvent::Callback { button, .. } = classify_update(&update) else {
            panic!("expected a callback event");
        };
        assert_eq!(button, None);
    }

    #[test]
    fn bare_updates_are_unsupported() {
        let update = Update { update_id: 4, message: None, callback_query: None };
        assert_eq!(classify_update(&update), ChatEvent::Unsupported);
    }
}
