use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::sale::NewSale;

/// Position of a wizard session in the guided entry sequence. Each variant
/// carries exactly the fields collected so far, so a draft can never be
/// confirmed with a stage's field missing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WizardStage {
    Company,
    Agent {
        company: String,
    },
    AgentNewName {
        company: String,
    },
    PropertyType {
        company: String,
        agent: String,
    },
    District {
        company: String,
        agent: String,
        property_type: String,
    },
    Price {
        company: String,
        agent: String,
        property_type: String,
        district: String,
    },
    Commission {
        company: String,
        agent: String,
        property_type: String,
        district: String,
        price: Decimal,
    },
    Confirm {
        draft: SaleDraft,
    },
}

/// The fully collected draft shown at the confirmation stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleDraft {
    pub company: String,
    pub agent: String,
    pub property_type: String,
    pub district: String,
    pub price: Decimal,
    pub commission: Decimal,
}

impl SaleDraft {
    pub fn into_new_sale(self, client_name: Option<String>) -> NewSale {
        NewSale {
            agent_name: self.agent,
            company: self.company,
            property_type: self.property_type,
            location: self.district,
            price: self.price,
            commission: self.commission,
            client_name,
            notes: None,
        }
    }
}

/// Closed set of button actions the gateway adapter can decode. The engine
/// matches these exhaustively per stage; anything else re-prompts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardButton {
    Company(String),
    Agent(String),
    NewAgent,
    PropertyType(String),
    District(String),
    Save,
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyMode {
    /// Deliver as a fresh message.
    New,
    /// Replace the message whose button triggered this reply.
    Edit,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonSpec {
    pub label: String,
    pub action: WizardButton,
}

impl ButtonSpec {
    pub fn new(label: impl Into<String>, action: WizardButton) -> Self {
        Self { label: label.into(), action }
    }
}

/// Outbound reply produced by the engine: prompt text plus button rows,
/// rendered to gateway calls by the chat adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WizardReply {
    pub mode: ReplyMode,
    pub text: String,
    pub keyboard: Vec<Vec<ButtonSpec>>,
}

impl WizardReply {
    pub fn new(mode: ReplyMode, text: impl Into<String>) -> Self {
        Self { mode, text: text.into(), keyboard: Vec::new() }
    }

    pub fn with_keyboard(mut self, keyboard: Vec<Vec<ButtonSpec>>) -> Self {
        self.keyboard = keyboard;
        self
    }
}
