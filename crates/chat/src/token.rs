//! Callback payload codec. Buttons carry an opaque token; the adapter
//! decodes it back into the engine's closed `WizardButton` set, so the
//! engine never routes on raw strings.

use propfair_core::wizard::WizardButton;

const COMPANY: &str = "company:";
const AGENT: &str = "agent:";
const NEW_AGENT: &str = "agent_new";
const PROPERTY_TYPE: &str = "ptype:";
const DISTRICT: &str = "district:";
const SAVE: &str = "save";
const CANCEL: &str = "cancel";

pub fn encode(button: &WizardButton) -> String {
    match button {
        WizardButton::Company(name) => format!("{COMPANY}{name}"),
        WizardButton::Agent(name) => format!("{AGENT}{name}"),
        WizardButton::NewAgent => NEW_AGENT.to_string(),
        WizardButton::PropertyType(name) => format!("{PROPERTY_TYPE}{name}"),
        WizardButton::District(name) => format!("{DISTRICT}{name}"),
        WizardButton::Save => SAVE.to_string(),
        WizardButton::Cancel => CANCEL.to_string(),
    }
}

/// Inverse of `encode`. Unknown payloads decode to `None` and are dropped
/// by the handler after acknowledging the press.
pub fn parse(data: &str) -> Option<WizardButton> {
    match data {
        NEW_AGENT => return Some(WizardButton::NewAgent),
        SAVE => return Some(WizardButton::Save),
        CANCEL => return Some(WizardButton::Cancel),
        _ => {}
    }

    if let Some(name) = data.strip_prefix(COMPANY) {
        return non_empty(name).map(WizardButton::Company);
    }
    if let Some(name) = data.strip_prefix(AGENT) {
        return non_empty(name).map(WizardButton::Agent);
    }
    if let Some(name) = data.strip_prefix(PROPERTY_TYPE) {
        return non_empty(name).map(WizardButton::PropertyType);
    }
    if let Some(name) = data.strip_prefix(DISTRICT) {
        return non_empty(name).map(WizardButton::District);
    }

    None
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
