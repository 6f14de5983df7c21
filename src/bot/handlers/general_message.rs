use teloxide::prelude::*;

use crate::bot::commands::{challenge, progress, tasks};
use crate::bot::commands::challenge::TASK_PROMPT;
use crate::bot::conversation::{user_dialogue, ConversationState, ConversationStorage, TextStep};
use crate::bot::handlers::HandlerResult;
use crate::bot::keyboards::{main_keyboard, MainMenu};
use crate::database::connection::DatabaseManager;
use crate::services::scheduler::SchedulerGateway;
use crate::utils::{
    feedback::{CommandFeedback, FeedbackType},
    logging::log_validation_error,
};

/// Free text: main-menu buttons first, then whatever the conversation stage expects.
pub async fn handle_general_message(
    bot: Bot,
    msg: Message,
    db: DatabaseManager,
    gateway: SchedulerGateway,
    storage: ConversationStorage,
) -> HandlerResult {
    let (Some(text), Some(user)) = (msg.text(), msg.from().cloned()) else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;
    let dialogue = user_dialogue(storage, &user);
    let feedback = CommandFeedback::new(bot.clone(), chat_id);
    
    if let Some(item) = MainMenu::from_text(text) {
        match item {
            MainMenu::NewChallenge => challenge::prompt_hours(&bot, chat_id, &dialogue).await?,
            MainMenu::Progress => {
                dialogue.update(ConversationState::Idle).await?;
                progress::handle_stats(bot, chat_id, user_id, &db).await?;
            }
            MainMenu::Tasks => {
                dialogue.update(ConversationState::Idle).await?;
                tasks::handle_list(bot, chat_id, user_id, &db).await?;
            }
            MainMenu::Badges => {
                dialogue.update(ConversationState::Idle).await?;
                progress::handle_badges(bot, chat_id, user_id, &db).await?;
            }
        }
        return Ok(());
    }
    
    let state = dialogue.get_or_default().await?;
    
    match state.on_text(text) {
        TextStep::SplitAccepted(next) => {
            dialogue.update(next).await?;
            bot.send_message(chat_id, TASK_PROMPT).await?;
        }
        TextStep::SplitRejected(e) => {
            log_validation_error(state.stage_name(), text, &e.to_string(), user_id);
            feedback.validation_error(&format!("Invalid split: {e}"), "Type two numbers, for example: 52 8").await?;
        }
        TextStep::ChallengeReady { hours, study, rest, task } => {
            dialogue.update(ConversationState::Idle).await?;
            challenge::start_challenge(&bot, chat_id, &user, hours, study, rest, task, &db, &gateway).await?;
            bot.send_message(chat_id, "Use the menu below any time.")
                .reply_markup(main_keyboard())
                .await?;
        }
        TextStep::NewTaskTitle(title) => {
            dialogue.update(ConversationState::Idle).await?;
            tasks::add_task(&bot, chat_id, user_id, &title, &db).await?;
        }
        TextStep::InvalidTitle(e) => {
            log_validation_error(state.stage_name(), text, &e, user_id);
            feedback.validation_error(&e, "Send a short single-line title").await?;
        }
        TextStep::NotExpected => {
            if text.starts_with('/') {
                let error_msg = format!(
                    "Unknown command: {}",
                    text.split_whitespace().next().unwrap_or(text)
                );
                feedback.validation_error(&error_msg, "Use /help to see all available commands").await?;
            } else {
                feedback
                    .send_with_markup(
                        FeedbackType::Info,
                        "Use the menu to start a challenge or manage your tasks.",
                        main_keyboard(),
                    )
                    .await?;
            }
        }
    }
    
    Ok(())
}
