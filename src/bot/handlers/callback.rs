use teloxide::prelude::*;

use crate::bot::callback_data::CallbackAction;
use crate::bot::commands::challenge::{prompt_split, CUSTOM_SPLIT_PROMPT, TASK_PROMPT};
use crate::bot::conversation::{user_dialogue, ConversationState, ConversationStorage};
use crate::bot::handlers::HandlerResult;

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    storage: ConversationStorage,
) -> HandlerResult {
    let user_id = q.from.id.0;
    
    let Some(data) = q.data.as_deref() else {
        bot.answer_callback_query(q.id.clone()).text("Unsupported button").await?;
        return Ok(());
    };
    
    tracing::info!("Callback received: '{}' from user {}", data, user_id);
    
    let action = match data.parse::<CallbackAction>() {
        Ok(action) => action,
        Err(e) => {
            tracing::warn!("Rejected callback '{}' from user {}: {}", data, user_id, e);
            bot.answer_callback_query(q.id.clone())
                .text("This button is no longer valid")
                .await?;
            return Ok(());
        }
    };
    
    let dialogue = user_dialogue(storage, &q.from);
    let next = ConversationState::on_callback(&action);
    tracing::debug!("User {} moves to stage {}", user_id, next.stage_name());
    dialogue.update(next).await?;
    
    bot.answer_callback_query(q.id.clone()).await?;
    
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    
    match action {
        CallbackAction::Hours(hours) => {
            prompt_split(&bot, message.chat.id, message.id, hours).await?;
        }
        CallbackAction::Split { .. } => {
            bot.send_message(message.chat.id, TASK_PROMPT).await?;
        }
        CallbackAction::CustomSplit { .. } => {
            bot.send_message(message.chat.id, CUSTOM_SPLIT_PROMPT).await?;
        }
    }
    
    Ok(())
}
