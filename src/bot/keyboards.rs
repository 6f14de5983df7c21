use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

use crate::bot::callback_data::CallbackAction;

pub const HOUR_CHOICES: [u32; 5] = [1, 2, 3, 4, 5];
pub const SPLIT_PRESETS: [(u32, u32); 4] = [(55, 5), (50, 10), (45, 15), (40, 20)];

/// Buttons of the persistent reply keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainMenu {
    NewChallenge,
    Progress,
    Tasks,
    Badges,
}

impl MainMenu {
    pub fn label(&self) -> &'static str {
        match self {
            MainMenu::NewChallenge => "🎯 New challenge",
            MainMenu::Progress => "📊 My progress",
            MainMenu::Tasks => "📝 My tasks",
            MainMenu::Badges => "🏆 Badges",
        }
    }

    pub fn from_text(text: &str) -> Option<Self> {
        [MainMenu::NewChallenge, MainMenu::Progress, MainMenu::Tasks, MainMenu::Badges]
            .into_iter()
            .find(|item| item.label() == text.trim())
    }
}

pub fn main_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(MainMenu::NewChallenge.label()),
            KeyboardButton::new(MainMenu::Progress.label()),
        ],
        vec![
            KeyboardButton::new(MainMenu::Tasks.label()),
            KeyboardButton::new(MainMenu::Badges.label()),
        ],
    ])
    .resize_keyboard(true)
}

pub fn hours_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(HOUR_CHOICES.iter().map(|&hours| {
        let label = if hours == 1 { "1 hour".to_string() } else { format!("{hours} hours") };
        vec![InlineKeyboardButton::callback(label, CallbackAction::Hours(hours).to_string())]
    }))
}

pub fn splits_keyboard(hours: u32) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = SPLIT_PRESETS
        .iter()
        .map(|&(study, rest)| {
            vec![InlineKeyboardButton::callback(
                format!("{study}m / {rest}m"),
                CallbackAction::Split { hours, study, rest }.to_string(),
            )]
        })
        .collect();
    
    rows.push(vec![InlineKeyboardButton::callback(
        "🔧 Custom split",
        CallbackAction::CustomSplit { hours }.to_string(),
    )]);
    
    InlineKeyboardMarkup::new(rows)
}
