use std::sync::Arc;

use crate::amount::{format_amount, parse_commission, parse_price};
use crate::catalog::Catalog;
use crate::domain::sale::SaleRecord;
use crate::domain::UserId;
use crate::store::SaleStore;
use crate::wizard::session::{SessionStore, WizardSession};
use crate::wizard::stage::{
    ButtonSpec, ReplyMode, SaleDraft, WizardButton, WizardReply, WizardStage,
};

const CLIENT_ATTRIBUTION: &str = "Client recorded via chat";

/// Per-user guided entry state machine. One inbound event is handled at a
/// time per user; different users' sessions never touch each other.
pub struct WizardEngine<S> {
    sessions: S,
    store: Arc<dyn SaleStore>,
    catalog: Catalog,
    admin: UserId,
}

impl<S> WizardEngine<S>
where
    S: SessionStore,
{
    pub fn new(sessions: S, store: Arc<dyn SaleStore>, catalog: Catalog, admin: UserId) -> Self {
        Self { sessions, store, catalog, admin }
    }

    pub fn is_admin(&self, user: UserId) -> bool {
        user == self.admin
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Begin (or restart) the wizard. Non-admin users are rejected before
    /// any session state exists.
    pub async fn start(&self, user: UserId) -> WizardReply {
        if !self.is_admin(user) {
            return WizardReply::new(
                ReplyMode::New,
                "❌ Only the administrator can record sales.",
            );
        }

        self.sessions.put(user, WizardSession::new(WizardStage::Company)).await;
        self.company_prompt(ReplyMode::New)
    }

    /// Button input. A button that does not belong to the current stage
    /// re-prompts that stage without touching the draft.
    pub async fn on_button(&self, user: UserId, button: WizardButton) -> Option<WizardReply> {
        if !self.is_admin(user) {
            return Some(WizardReply::new(
                ReplyMode::Edit,
                "❌ Only the administrator can record sales.",
            ));
        }

        let Some(session) = self.sessions.get(user).await else {
            return Some(WizardReply::new(
                ReplyMode::Edit,
                "No sale entry in progress. Send /newsale to begin.",
            ));
        };

        let reply = match (session.stage, button) {
            (WizardStage::Company, WizardButton::Company(company))
                if self.catalog.has_company(&company) =>
            {
                let agents = self.known_agents(&company).await;
                let reply = self.agent_prompt(&company, &agents, ReplyMode::Edit);
                self.advance(user, WizardStage::Agent { company }).await;
                reply
            }
            (WizardStage::Agent { company }, WizardButton::Agent(agent))
                if agent.trim().len() >= 2 =>
            {
                let reply = self.property_type_prompt(&company, &agent, ReplyMode::Edit);
                self.advance(user, WizardStage::PropertyType { company, agent }).await;
                reply
            }
            (WizardStage::Agent { company }, WizardButton::NewAgent) => {
                let reply = WizardReply::new(
                    ReplyMode::Edit,
                    format!("Company: {company}\n\n✍️ Type the agent's name:"),
                );
                self.advance(user, WizardStage::AgentNewName { company }).await;
                reply
            }
            (
                WizardStage::PropertyType { company, agent },
                WizardButton::PropertyType(property_type),
            ) if self.catalog.has_property_type(&property_type) => {
                let reply = self.district_prompt(&company, &agent, &property_type, ReplyMode::Edit);
                self.advance(user, WizardStage::District { company, agent, property_type }).await;
                reply
            }
            (
                WizardStage::District { company, agent, property_type },
                WizardButton::District(district),
            ) if self.catalog.has_district(&district) => {
                let reply = price_prompt(&company, &agent, &property_type, &district);
                self.advance(user, WizardStage::Price { company, agent, property_type, district })
                    .await;
                reply
            }
            (WizardStage::Confirm { draft }, WizardButton::Save) => {
                self.sessions.remove(user).await;
                self.persist(draft).await
            }
            (WizardStage::Confirm { .. }, WizardButton::Cancel) => {
                self.sessions.remove(user).await;
                WizardReply::new(ReplyMode::Edit, "❌ Sale entry cancelled.")
            }
            // Stale or mismatched button: repeat the current stage's
            // instructions, draft untouched.
            (stage, _) => self.reprompt(&stage).await,
        };

        Some(reply)
    }

    /// Free-text input. Only the name/price/commission stages accept text;
    /// anywhere else (or outside a session) the message is ignored.
    pub async fn on_text(&self, user: UserId, text: &str) -> Option<WizardReply> {
        if !self.is_admin(user) {
            return None;
        }
        let session = self.sessions.get(user).await?;
        let text = text.trim();

        match session.stage {
            WizardStage::AgentNewName { company } => {
                if text.len() < 2 {
                    return Some(WizardReply::new(
                        ReplyMode::New,
                        "⚠️ That name is too short. Type the agent's name:",
                    ));
                }
                let agent = text.to_string();
                let reply = self.property_type_prompt(&company, &agent, ReplyMode::New);
                self.advance(user, WizardStage::PropertyType { company, agent }).await;
                Some(reply)
            }
            WizardStage::Price { company, agent, property_type, district } => {
                match parse_price(text) {
                    Ok(price) => {
                        self.advance(
                            user,
                            WizardStage::Commission {
                                company,
                                agent,
                                property_type,
                                district,
                                price,
                            },
                        )
                        .await;
                        Some(WizardReply::new(
                            ReplyMode::New,
                            "💸 Enter the commission (numbers only, 0 if none):",
                        ))
                    }
                    Err(_) => Some(WizardReply::new(
                        ReplyMode::New,
                        "⚠️ Invalid price. Type a number greater than zero (e.g. 180000).",
                    )),
                }
            }
            WizardStage::Commission { company, agent, property_type, district, price } => {
                match parse_commission(text) {
                    Ok(commission) => {
                        let draft = SaleDraft {
                            company,
                            agent,
                            property_type,
                            district,
                            price,
                            commission,
                        };
                        let reply = confirm_prompt(&draft);
                        self.advance(user, WizardStage::Confirm { draft }).await;
                        Some(reply)
                    }
                    Err(_) => Some(WizardReply::new(
                        ReplyMode::New,
                        "⚠️ Invalid commission. Type a number of at least zero (e.g. 9000).",
                    )),
                }
            }
            // Button stages do not consume text.
            _ => None,
        }
    }

    async fn advance(&self, user: UserId, stage: WizardStage) {
        self.sessions.put(user, WizardSession::new(stage)).await;
    }

    /// Atomic hand-off to the record store. The session is already gone by
    /// the time this runs; a failed create loses the draft by design.
    async fn persist(&self, draft: SaleDraft) -> WizardReply {
        let sale = draft.into_new_sale(Some(CLIENT_ATTRIBUTION.to_string()));
        match self.store.create(sale).await {
            Ok(record) => {
                tracing::info!(
                    event_name = "sale.recorded.wizard",
                    sale_id = record.id.0,
                    "sale recorded via guided entry"
                );
                wizard_success_reply(&record)
            }
            Err(store_error) => {
                tracing::error!(
                    event_name = "sale.wizard.persistence_failed",
                    error = %store_error,
                    "wizard create failed; draft discarded"
                );
                WizardReply::new(
                    ReplyMode::Edit,
                    "❌ The sale could not be saved. The entry was discarded; \
                     send /newsale to try again.",
                )
            }
        }
    }

    /// Agents already recorded for the company. A store failure degrades to
    /// an empty list, which renders as the "add new" option alone.
    async fn known_agents(&self, company: &str) -> Vec<String> {
        match self.store.list_agents(company).await {
            Ok(agents) => agents,
            Err(store_error) => {
                tracing::warn!(
                    event_name = "sale.wizard.agent_lookup_failed",
                    company,
                    error = %store_error,
                    "agent lookup failed; offering only the new-agent option"
                );
                Vec::new()
            }
        }
    }

    async fn reprompt(&self, stage: &WizardStage) -> WizardReply {
        match stage {
            WizardStage::Company => self.company_prompt(ReplyMode::Edit),
            WizardStage::Agent { company } => {
                let agents = self.known_agents(company).await;
                self.agent_prompt(company, &agents, ReplyMode::Edit)
            }
            WizardStage::AgentNewName { company } => WizardReply::new(
                ReplyMode::Edit,
                format!("Company: {company}\n\n✍️ Type the agent's name:"),
            ),
            WizardStage::PropertyType { company, agent } => {
                self.property_type_prompt(company, agent, ReplyMode::Edit)
            }
            WizardStage::District { company, agent, property_type } => {
                self.district_prompt(company, agent, property_type, ReplyMode::Edit)
            }
            WizardStage::Price { company, agent, property_type, district } => {
                price_prompt(company, agent, property_type, district)
            }
            WizardStage::Commission { .. } => WizardReply::new(
                ReplyMode::Edit,
                "💸 Enter the commission (numbers only, 0 if none):",
            ),
            WizardStage::Confirm { draft } => confirm_prompt(draft),
        }
    }

    fn company_prompt(&self, mode: ReplyMode) -> WizardReply {
        let keyboard = self
            .catalog
            .companies
            .iter()
            .map(|company| {
                vec![ButtonSpec::new(company.clone(), WizardButton::Company(company.clone()))]
            })
            .collect();
        WizardReply::new(mode, "🏢 Select the company:").with_keyboard(keyboard)
    }

    fn agent_prompt(&self, company: &str, agents: &[String], mode: ReplyMode) -> WizardReply {
        let mut keyboard: Vec<Vec<ButtonSpec>> = agents
            .iter()
            .map(|agent| vec![ButtonSpec::new(agent.clone(), WizardButton::Agent(agent.clone()))])
            .collect();
        keyboard.push(vec![ButtonSpec::new("➕ New agent", WizardButton::NewAgent)]);

        WizardReply::new(mode, format!("Company: {company}\n\n👤 Select the agent:"))
            .with_keyboard(keyboard)
    }

    fn property_type_prompt(&self, company: &str, agent: &str, mode: ReplyMode) -> WizardReply {
        let keyboard = self
            .catalog
            .property_types
            .iter()
            .map(|property_type| {
                vec![ButtonSpec::new(
                    property_type.clone(),
                    WizardButton::PropertyType(property_type.clone()),
                )]
            })
            .collect();

        WizardReply::new(
            mode,
            format!("Company: {company}\nAgent: {agent}\n\n🏠 Select the property type:"),
        )
        .with_keyboard(keyboard)
    }

    fn district_prompt(
        &self,
        company: &str,
        agent: &str,
        property_type: &str,
        mode: ReplyMode,
    ) -> WizardReply {
        let keyboard = self
            .catalog
            .districts
            .iter()
            .map(|district| {
                vec![ButtonSpec::new(district.clone(), WizardButton::District(district.clone()))]
            })
            .collect();

        WizardReply::new(
            mode,
            format!(
                "Company: {company}\nAgent: {agent}\nType: {property_type}\n\n\
                 📍 Select the district:"
            ),
        )
        .with_keyboard(keyboard)
    }
}

fn wizard_success_reply(record: &SaleRecord) -> WizardReply {
    WizardReply::new(
        ReplyMode::Edit,
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
        ),
    )
}

fn price_prompt(company: &str, agent: &str, property_type: &str, district: &str) -> WizardReply {
    WizardReply::new(
        ReplyMode::Edit,
        format!(
            "Company: {company}\nAgent: {agent}\nType: {property_type}\nDistrict: {district}\n\n\
             💰 Enter the price (numbers only):"
        ),
    )
}

fn confirm_prompt(draft: &SaleDraft) -> WizardReply {
    WizardReply::new(
        ReplyMode::New,
        format!(
            "🧾 CONFIRM SALE\n\n\
             🏢 Company: {company}\n\
             👤 Agent: {agent}\n\
             🏠 Type: {property_type}\n\
             📍 District: {district}\n\
             💰 Price: ${price}\n\
             💸 Commission: ${commission}\n\n\
             Save this sale?",
            company = draft.company,
            agent = draft.agent,
            property_type = draft.property_type,
            district = draft.district,
            price = format_amount(&draft.price),
            commission = format_amount(&draft.commission),
        ),
    )
    .with_keyboard(vec![
        vec![ButtonSpec::new("✅ Save", WizardButton::Save)],
        vec![ButtonSpec::new("❌ Cancel", WizardButton::Cancel)],
    ])
}
