//! Per-user conversation stage.
//!
//! Decides how the next free-text message is read (custom split, challenge
//! goal or new to-do title). Kept in memory only, keyed by Telegram user id
//! through teloxide's `InMemStorage`, whose lock serialises concurrent updates
//! for the same user (last write wins).

use std::sync::Arc;
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};
use teloxide::types::{ChatId, User};

use crate::bot::callback_data::CallbackAction;
use crate::utils::validation::{parse_custom_split, validate_task_title, SplitInputError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingSplit { hours: u32 },
    AwaitingCustomSplit { hours: u32 },
    AwaitingTask { hours: u32, study: u32, rest: u32 },
    AwaitingNewTaskTitle,
}

pub type ConversationStorage = Arc<InMemStorage<ConversationState>>;
pub type ConversationDialogue = Dialogue<ConversationState, InMemStorage<ConversationState>>;

/// Dialogue slot for a user, independent of which chat the update came from.
pub fn user_dialogue(storage: ConversationStorage, user: &User) -> ConversationDialogue {
    Dialogue::new(storage, ChatId(user.id.0 as i64))
}

/// What a free-text message means in the current stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextStep {
    /// Custom split accepted; the new stage asks for the goal.
    SplitAccepted(ConversationState),
    SplitRejected(SplitInputError),
    ChallengeReady { hours: u32, study: u32, rest: u32, task: String },
    NewTaskTitle(String),
    InvalidTitle(String),
    /// Nothing is waiting for text input.
    NotExpected,
}

impl ConversationState {
    /// Stage after an inline button press. Buttons carry everything they need,
    /// so they apply whatever the current stage is.
    pub fn on_callback(action: &CallbackAction) -> Self {
        match *action {
            CallbackAction::Hours(hours) => ConversationState::AwaitingSplit { hours },
            CallbackAction::Split { hours, study, rest } => {
                ConversationState::AwaitingTask { hours, study, rest }
            }
            CallbackAction::CustomSplit { hours } => ConversationState::AwaitingCustomSplit { hours },
        }
    }

    pub fn on_text(&self, text: &str) -> TextStep {
        match *self {
            ConversationState::AwaitingCustomSplit { hours } => match parse_custom_split(text) {
                Ok((study, rest)) => {
                    TextStep::SplitAccepted(ConversationState::AwaitingTask { hours, study, rest })
                }
                Err(e) => TextStep::SplitRejected(e),
            },
            ConversationState::AwaitingTask { hours, study, rest } => match validate_task_title(text) {
                Ok(task) => TextStep::ChallengeReady { hours, study, rest, task },
                Err(e) => TextStep::InvalidTitle(e.to_string()),
            },
            ConversationState::AwaitingNewTaskTitle => match validate_task_title(text) {
                Ok(title) => TextStep::NewTaskTitle(title),
                Err(e) => TextStep::InvalidTitle(e.to_string()),
            },
            ConversationState::Idle | ConversationState::AwaitingSplit { .. } => TextStep::NotExpected,
        }
    }

    pub fn stage_name(&self) -> &'static str {
        match self {
            ConversationState::Idle => "idle",
            ConversationState::AwaitingSplit { .. } => "awaiting_split",
            ConversationState::AwaitingCustomSplit { .. } => "awaiting_custom_split",
            ConversationState::AwaitingTask { .. } => "awaiting_task",
            ConversationState::AwaitingNewTaskTitle => "awaiting_new_task_title",
        }
    }
}
