pub mod engine;
pub mod session;
pub mod stage;

pub use engine::WizardEngine;
pub use session::{InMemorySessionStore, SessionStore, WizardSession};
pub use stage::{ButtonSpec, ReplyMode, SaleDraft, WizardButton, WizardReply, WizardStage};
