use serde::{Deserialize, Serialize};

use propfair_core::wizard::ButtonSpec;

use crate::token::encode;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// Renders engine button rows into a gateway keyboard. Empty rows render
/// as no keyboard at all.
pub fn markup_from_rows(rows: &[Vec<ButtonSpec>]) -> Option<InlineKeyboardMarkup> {
    if rows.is_empty() {
        return None;
    }

    let inline_keyboard = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| InlineKeyboardButton {
                    text: button.label.clone(),
                    callback_data: encode(&button.action),
                })
                .collect()
        })
        .collect();

    Some(InlineKeyboardMarkup { inline_keyboard })
}

#[cfg(test)]
mod tests {
    use propfair_core::wizard::{ButtonSpec, WizardButton};

    use super::markup_from_rows;

    #[test]
    fn empty_rows_render_no_keyboard() {
        assert!(markup_from_rows(&[]).is_none());
    }

    #[test]
    fn rows_keep_their_grid_shape() {
        let rows = vec![
            vec![ButtonSpec::new("✅ Save", WizardButton::Save)],
            vec![ButtonSpec::new("❌ Cancel", WizardButton::Cancel)],
        ];

        let markup = markup_from_rows(&rows).expect("keyboard");
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0][0].text, "✅ Save");
        assert_eq!(markup.inline_keyboard[0][0].callback_data, "save");
        assert_eq!(markup.inline_keyboard[1][0].callback_data, "cancel");
    }
}
