use teloxide::prelude::*;
use teloxide::types::{KeyboardRemove, MessageId};

use crate::bot::conversation::{ConversationDialogue, ConversationState};
use crate::bot::handlers::HandlerResult;
use crate::bot::keyboards::{hours_keyboard, splits_keyboard};
use crate::database::{connection::DatabaseManager, models::User};
use crate::services::planner::ChallengeRequest;
use crate::services::scheduler::SchedulerGateway;
use crate::utils::{
    feedback::CommandFeedback,
    logging::{log_command_error, log_command_success, log_database_error},
};

pub const TASK_PROMPT: &str = "Write the goal or subject you will study during this challenge:";
pub const CUSTOM_SPLIT_PROMPT: &str = "Type your split as <study> <rest> in minutes (for example: 52 8)";

/// First step of the flow: forget any half-finished input and ask for the length.
pub async fn prompt_hours(bot: &Bot, chat_id: ChatId, dialogue: &ConversationDialogue) -> HandlerResult {
    dialogue.update(ConversationState::Idle).await?;
    
    bot.send_message(chat_id, "Let's set up a new challenge.")
        .reply_markup(KeyboardRemove::new())
        .await?;
    bot.send_message(chat_id, "How many hours will the challenge last?")
        .reply_markup(hours_keyboard())
        .await?;
    Ok(())
}

pub async fn prompt_split(bot: &Bot, chat_id: ChatId, message_id: MessageId, hours: u32) -> HandlerResult {
    bot.edit_message_text(chat_id, message_id, "How do you want to split each hour?")
        .reply_markup(splits_keyboard(hours))
        .await?;
    Ok(())
}

/// Plans the challenge and registers every event, then confirms to the user.
#[allow(clippy::too_many_arguments)]
pub async fn start_challenge(
    bot: &Bot,
    chat_id: ChatId,
    user: &teloxide::types::User,
    hours: u32,
    study: u32,
    rest: u32,
    task: String,
    db: &DatabaseManager,
    gateway: &SchedulerGateway,
) -> HandlerResult {
    let user_id = user.id.0 as i64;
    let feedback = CommandFeedback::new(bot.clone(), chat_id);
    
    if let Err(e) = User::ensure(&db.pool, user_id, user.username.clone(), Some(user.first_name.clone())).await {
        log_database_error("ensure", "users", &e.to_string());
        feedback.error("Could not save your profile, please try again later").await?;
        return Ok(());
    }
    
    let request = match ChallengeRequest::new(user_id, chat_id.0, hours, study, rest, task) {
        Ok(request) => request,
        Err(e) => {
            log_command_error("challenge", user_id, &e.to_string());
            feedback.validation_error(&e.to_string(), "Start again with /challenge").await?;
            return Ok(());
        }
    };
    
    let events = request.plan(chrono::Utc::now());
    let sessions = events.len() / 2;
    
    if let Err(e) = gateway.register_plan(&events).await {
        log_command_error("challenge", user_id, &e.to_string());
        feedback.error("Could not schedule your challenge, please try again later").await?;
        return Ok(());
    }
    
    log_command_success(
        "challenge",
        user_id,
        Some(&format!("{hours}h as {study}/{rest}, {sessions} sessions on '{}'", request.task)),
    );
    
    feedback.success(&format!(
        "Challenge on! {hours} hour(s) of {}: {sessions} session(s) of {study} minutes with {rest} minutes rest. I'll message you when each session starts and ends.",
        request.task
    )).await?;
    Ok(())
}
