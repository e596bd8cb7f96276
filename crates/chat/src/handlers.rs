use std::sync::Arc;

use tracing::{error, info, warn};

use propfair_core::config::StatsConfig;
use propfair_core::domain::UserId;
use propfair_core::stats::{summarize, top_agents, top_companies, AgentRanking, CompanyRanking};
use propfair_core::wizard::{ReplyMode, SessionStore, WizardEngine, WizardReply};
use propfair_core::{format_amount, parse_quick_entry, SaleStore, QUICK_ENTRY_USAGE};

use crate::events::ChatEvent;
use crate::keyboard::{markup_from_rows, InlineKeyboardMarkup};

const QUICK_CLIENT_ATTRIBUTION: &str = "Client recorded via chat";

/// Gateway calls produced by one handled event, in delivery order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundAction {
    Send { chat_id: i64, text: String, keyboard: Option<InlineKeyboardMarkup> },
    Edit { chat_id: i64, message_id: i64, text: String, keyboard: Option<InlineKeyboardMarkup> },
    AnswerCallback { callback_id: String },
}

/// Routes typed events into the wizard engine, the quick-entry path and
/// the stats reporting. One event is fully handled before the next.
pub struct BotHandler<S> {
    engine: WizardEngine<S>,
    store: Arc<dyn SaleStore>,
    stats: StatsConfig,
}

impl<S> BotHandler<S>
where
    S: SessionStore,
{
    pub fn new(engine: WizardEngine<S>, store: Arc<dyn SaleStore>, stats: StatsConfig) -> Self {
        Self { engine, store, stats }
    }

    pub async fn handle(&self, event: ChatEvent) -> Vec<OutboundAction> {
        match event {
            ChatEvent::Command { user_id, chat_id, command } => {
                self.handle_command(user_id, chat_id, command).await
            }
            ChatEvent::Text { user_id, chat_id, text } => {
                match self.engine.on_text(user_id, &text).await {
                    Some(reply) => vec![render_reply(reply, chat_id, None)],
                    None => Vec::new(),
                }
            }
            ChatEvent::Callback { user_id, chat_id, message_id, callback_id, button } => {
                // The gateway expects every press acknowledged, even ones
                // whose token no longer decodes.
                let mut actions = vec![OutboundAction::AnswerCallback { callback_id }];
                let Some(button) = button else {
                    warn!(
                        event_name = "chat.callback.unknown_token",
                        user_id = %user_id,
                        "dropping callback with undecodable payload"
                    );
                    return actions;
                };
                if let Some(reply) = self.engine.on_button(user_id, button).await {
                    actions.push(render_reply(reply, chat_id, Some(message_id)));
                }
                actions
            }
            ChatEvent::Unsupported => Vec::new(),
        }
    }

    async fn handle_command(
        &self,
        user_id: UserId,
        chat_id: i64,
        command: crate::commands::BotCommand,
    ) -> Vec<OutboundAction> {
        use crate::commands::BotCommand::*;

        match command {
            Start => vec![send_text(chat_id, welcome_text())],
            Help | Unknown { .. } => vec![send_text(chat_id, help_text())],
            Stats => vec![send_text(chat_id, self.stats_message().await)],
            Ranking => vec![send_text(chat_id, self.ranking_message().await)],
            NewSale => {
                let reply = self.engine.start(user_id).await;
                vec![render_reply(reply, chat_id, None)]
            }
            QuickSale { args } => vec![send_text(chat_id, self.quick_sale(user_id, &args).await)],
        }
    }

    async fn quick_sale(&self, user_id: UserId, args: &str) -> String {
        if !self.engine.is_admin(user_id) {
            return "❌ Only the administrator can record sales.".to_string();
        }
        if args.trim().is_empty() {
            return QUICK_ENTRY_USAGE.to_string();
        }

        let sale = match parse_quick_entry(args, QUICK_CLIENT_ATTRIBUTION) {
            Ok(sale) => sale,
            Err(parse_error) => {
                return format!("⚠️ {parse_error}\n\n{QUICK_ENTRY_USAGE}");
            }
        };

        match self.store.create(sale).await {
            Ok(record) => {
                info!(
                    event_name = "sale.recorded.quick_entry",
                    sale_id = record.id.0,
                    user_id = %user_id,
                    "sale recorded via quick entry"
                );
                format!(
                    "✅ SALE RECORDED\n\n\
                     👤 {agent} ({company})\n\
                     🏠 {property_type} in {location}\n\
                     💰 ${price}\n\
                     💸 Commission: ${commission}",
                    agent = record.agent_name,
                    company = record.company,
                    property_type = record.property_type,
                    location = record.location,
                    price = format_amount(&record.price),
                    commission = format_amount(&record.commission),
                )
            }
            Err(store_error) => {
                error!(
                    event_name = "sale.quick_entry.persistence_failed",
                    user_id = %user_id,
                    error = %store_error,
                    "quick entry create failed"
                );
                "❌ The sale could not be saved. Please try again later.".to_string()
            }
        }
    }

    async fn stats_message(&self) -> String {
        let records = match self.store.all().await {
            Ok(records) => records,
            Err(store_error) => {
                error!(
                    event_name = "stats.read_failed",
                    error = %store_error,
                    "could not load records for stats"
                );
                return "❌ Statistics are unavailable right now.".to_string();
            }
        };

        let summary = summarize(&records);
        format!(
            "📊 SALES STATISTICS\n\n\
             🏠 Total sales: {count}\n\
             💰 Total volume: ${total}\n\
             💸 Total commission: ${commission}\n\
             📈 Average sale: ${average}",
            count = summary.count,
            total = format_amount(&summary.total_price),
            commission = format_amount(&summary.total_commission),
            average = format_amount(&summary.average_price),
        )
    }

    async fn ranking_message(&self) -> String {
        let records = match self.store.all().await {
            Ok(records) => records,
            Err(store_error) => {
                error!(
                    event_name = "stats.read_failed",
                    error = %store_error,
                    "could not load records for ranking"
                );
                return "❌ Rankings are unavailable right now.".to_string();
            }
        };

        if records.is_empty() {
            return "📊 No sales recorded yet.".to_string();
        }

        let agents = top_agents(&records, self.stats.top_agents);
        let companies = top_companies(&records, self.stats.top_companies);

        let mut message = String::from("🏆 AGENT RANKING\n\n");
        for (position, entry) in agents.iter().enumerate() {
            message.push_str(&agent_line(position + 1, entry));
        }
        message.push_str("\n🏢 COMPANY RANKING\n\n");
        for (position, entry) in companies.iter().enumerate() {
            message.push_str(&company_line(position + 1, entry));
        }
        message.trim_end().to_string()
    }
}

fn agent_line(position: usize, entry: &AgentRanking) -> String {
    format!(
        "{marker} {agent} ({company})\n   {sales} sales - ${total}\n\n",
        marker = medal(position),
        agent = entry.agent_name,
        company = entry.company,
        sales = entry.sales,
        total = format_amount(&entry.total_price),
    )
}

fn company_line(position: usize, entry: &CompanyRanking) -> String {
    format!(
        "{marker} {company}\n   {sales} sales - ${total}\n\n",
        marker = medal(position),
        company = entry.company,
        sales = entry.sales,
        total = format_amount(&entry.total_price),
    )
}

fn medal(position: usize) -> String {
    match position {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        other => format!("{other}."),
    }
}

fn welcome_text() -> String {
    format!("Welcome to the Propfair sales bot!\n\n{}", help_text())
}

fn help_text() -> String {
    "Commands:\n\
     /stats - sales statistics\n\
     /ranking - agent and company rankings\n\
     /sale - record a sale in one line (admin only)\n\
     /newsale - guided sale entry (admin only)\n\
     /help - this message"
        .to_string()
}

fn send_text(chat_id: i64, text: String) -> OutboundAction {
    OutboundAction::Send { chat_id, text, keyboard: None }
}

fn render_reply(reply: WizardReply, chat_id: i64, edit_target: Option<i64>) -> OutboundAction {
    let keyboard = markup_from_rows(&reply.keyboard);
    match (reply.mode, edit_target) {
        (ReplyMode::Edit, Some(message_id)) => {
            OutboundAction::Edit { chat_id, message_id, text: reply.text, keyboard }
        }
        _ => OutboundAction::Send { chat_id, text: reply.text, keyboard },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rust_decimal::Decimal;

    use propfair_core::catalog::Catalog;
    use propfair_core::config::StatsConfig;
    use propfair_core::domain::UserId;
    use propfair_core::store::SaleStore;
    use propfair_core::wizard::{InMemorySessionStore, WizardButton, WizardEngine};
    use propfair_db::{FailingSaleStore, InMemorySaleStore};

    use super::{BotHandler, OutboundAction};
    use crate::commands::BotCommand;
    use crate::events::ChatEvent;

    const ADMIN: UserId = UserId(42);
    const CHAT: i64 = 42;

    fn handler_over(
        store: Arc<dyn SaleStore>,
    ) -> BotHandler<InMemorySessionStore> {
        let engine = WizardEngine::new(
            InMemorySessionStore::new(Duration::ZERO),
            store.clone(),
            Catalog::default(),
            ADMIN,
        );
        BotHandler::new(engine, store, StatsConfig { top_agents: 10, top_companies: 5 })
    }

    fn command(user: UserId, command: BotCommand) -> ChatEvent {
        ChatEvent::Command { user_id: user, chat_id: CHAT, command }
    }

    fn text(user: UserId, body: &str) -> ChatEvent {
        ChatEvent::Text { user_id: user, chat_id: CHAT, text: body.to_string() }
    }

    fn callback(user: UserId, message_id: i64, button: WizardButton) -> ChatEvent {
        ChatEvent::Callback {
            user_id: user,
            chat_id: CHAT,
            message_id,
            callback_id: format!("cb-{message_id}"),
            button: Some(button),
        }
    }

    fn sent_text(action: &OutboundAction) -> &str {
        match action {
            OutboundAction::Send { text, .. } | OutboundAction::Edit { text, .. } => text,
            OutboundAction::AnswerCallback { .. } => panic!("expected a message action"),
        }
    }

    #[tokio::test]
    async fn full_wizard_conversation_creates_a_record() {
        let store = Arc::new(InMemorySaleStore::new());
        let handler = handler_over(store.clone());

        let actions = handler.handle(command(ADMIN, BotCommand::NewSale)).await;
        assert!(sent_text(&actions[0]).contains("Select the company"));

        handler
            .handle(callback(ADMIN, 1, WizardButton::Company("InmoPlus".into())))
            .await;
        handler.handle(callback(ADMIN, 1, WizardButton::NewAgent)).await;
        handler.handle(text(ADMIN, "María García")).await;
        handler
            .handle(callback(ADMIN, 2, WizardButton::PropertyType("Apartment".into())))
            .await;
        handler
            .handle(callback(ADMIN, 2, WizardButton::District("Miraflores".into())))
            .await;
        handler.handle(text(ADMIN, "180,000")).await;
        let confirm = handler.handle(text(ADMIN, "9000")).await;
        assert!(sent_text(&confirm[0]).contains("CONFIRM SALE"));

        let saved = handler.handle(callback(ADMIN, 3, WizardButton::Save)).await;
        assert!(matches!(saved[0], OutboundAction::AnswerCallback { .. }));
        assert!(sent_text(&saved[1]).contains("SALE RECORDED"));

        let records = store.all().await.expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].agent_name, "María García");
        assert_eq!(records[0].price, Decimal::new(180_000, 0));
    }

    #[tokio::test]
    async fn callback_replies_edit_the_triggering_message() {
        let store = Arc::new(InMemorySaleStore::new());
        let handler = handler_over(store);

        handler.handle(command(ADMIN, BotCommand::NewSale)).await;
        let actions = handler
            .handle(callback(ADMIN, 77, WizardButton::Company("InmoPlus".into())))
            .await;

        assert!(matches!(actions[0], OutboundAction::AnswerCallback { .. }));
        let OutboundAction::Edit { message_id, ref text, .. } = actions[1] else {
            panic!("expected an edit action");
        };
        assert_eq!(message_id, 77);
        assert!(text.contains("Select the agent"));
    }

    #[tokio::test]
    async fn undecodable_callback_is_acknowledged_and_dropped() {
        let store = Arc::new(InMemorySaleStore::new());
        let handler = handler_over(store);

        let actions = handler
            .handle(ChatEvent::Callback {
                user_id: ADMIN,
                chat_id: CHAT,
                message_id: 5,
                callback_id: "cb-5".to_string(),
                button: None,
            })
            .await;

        assert_eq!(
            actions,
            vec![OutboundAction::AnswerCallback { callback_id: "cb-5".to_string() }]
        );
    }

    #[tokio::test]
    async fn non_admin_newsale_is_rejected() {
        let store = Arc::new(InMemorySaleStore::new());
        let handler = handler_over(store.clone());

        let actions = handler.handle(command(UserId(7), BotCommand::NewSale)).await;
        assert!(sent_text(&actions[0]).contains("administrator"));
        assert_eq!(store.count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn quick_sale_round_trip_and_rejections() {
        let store = Arc::new(InMemorySaleStore::new());
        let handler = handler_over(store.clone());

        let ok = handler
            .handle(command(
                ADMIN,
                BotCommand::QuickSale { args: "Ana,VentaMax,House,Surco,95000,4750".to_string() },
            ))
            .await;
        assert!(sent_text(&ok[0]).contains("SALE RECORDED"));
        assert_eq!(store.count().await.expect("count"), 1);

        let usage = handler
            .handle(command(ADMIN, BotCommand::QuickSale { args: String::new() }))
            .await;
        assert!(sent_text(&usage[0]).contains("Format: /sale"));

        let bad = handler
            .handle(command(
                ADMIN,
                BotCommand::QuickSale { args: "Ana,VentaMax,House,Surco,zero".to_string() },
            ))
            .await;
        assert!(sent_text(&bad[0]).contains("invalid price"));

        let forbidden = handler
            .handle(command(
                UserId(7),
                BotCommand::QuickSale { args: "Ana,VentaMax,House,Surco,95000".to_string() },
            ))
            .await;
        assert!(sent_text(&forbidden[0]).contains("administrator"));
        assert_eq!(store.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn stats_on_an_empty_store_reports_zeroes() {
        let store = Arc::new(InMemorySaleStore::new());
        let handler = handler_over(store);

        let actions = handler.handle(command(UserId(7), BotCommand::Stats)).await;
        let body = sent_text(&actions[0]);
        assert!(body.contains("Total sales: 0"));
        assert!(body.contains("Average sale: $0"));
    }

    #[tokio::test]
    async fn ranking_lists_agents_and_companies() {
        let store = Arc::new(InMemorySaleStore::new());
        propfair_db::fixtures::seed(store.as_ref()).await.expect("seed");
        let handler = handler_over(store);

        let actions = handler.handle(command(UserId(7), BotCommand::Ranking)).await;
        let body = sent_text(&actions[0]);
        assert!(body.contains("AGENT RANKING"));
        assert!(body.contains("COMPANY RANKING"));
        assert!(body.contains("🥇 María García (InmoPlus)"));
    }

    #[tokio::test]
    async fn ranking_on_an_empty_store_degrades_gracefully() {
        let store = Arc::new(InMemorySaleStore::new());
        let handler = handler_over(store);

        let actions = handler.handle(command(UserId(7), BotCommand::Ranking)).await;
        assert_eq!(sent_text(&actions[0]), "📊 No sales recorded yet.");
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_a_contained_error_message() {
        let store = Arc::new(FailingSaleStore);
        let handler = handler_over(store);

        let actions = handler.handle(command(UserId(7), BotCommand::Stats)).await;
        assert!(sent_text(&actions[0]).contains("unavailable"));
    }

    #[tokio::test]
    async fn unknown_command_falls_back_to_help() {
        let store = Arc::new(InMemorySaleStore::new());
        let handler = handler_over(store);

        let actions = handler
            .handle(command(UserId(7), BotCommand::Unknown { verb: "frobnicate".to_string() }))
            .await;
        assert!(sent_text(&actions[0]).contains("/newsale"));
    }
}
