use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::{challenge, progress, tasks, Command};
use crate::bot::conversation::{user_dialogue, ConversationState, ConversationStorage};
use crate::bot::handlers::HandlerResult;
use crate::bot::keyboards::main_keyboard;
use crate::database::{connection::DatabaseManager, models::User};
use crate::utils::logging::{log_command_start, log_database_error};

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    db: DatabaseManager,
    storage: ConversationStorage,
) -> HandlerResult {
    let Some(user) = msg.from().cloned() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;
    let username = user.username.as_deref().unwrap_or("unknown");
    let dialogue = user_dialogue(storage, &user);
    
    log_command_start(&format!("{cmd:?}"), username, user_id, chat_id.0, None);
    
    match cmd {
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string()).await?;
        }
        Command::Start => {
            dialogue.update(ConversationState::Idle).await?;
            if let Err(e) = User::ensure(&db.pool, user_id, user.username.clone(), Some(user.first_name.clone())).await {
                log_database_error("ensure", "users", &e.to_string());
            }
            bot.send_message(
                chat_id,
                format!(
                    "Hi {}! 👋\nI'm TreloxBot. Pick a challenge length, split it into study and rest, and I'll keep you on track.",
                    user.first_name
                ),
            )
            .reply_markup(main_keyboard())
            .await?;
        }
        Command::Challenge => {
            challenge::prompt_hours(&bot, chat_id, &dialogue).await?;
        }
        Command::Tasks => {
            tasks::handle_list(bot, chat_id, user_id, &db).await?;
        }
        Command::AddTask => {
            tasks::prompt_new_task(&bot, chat_id, &dialogue).await?;
        }
        Command::DoneTask(argument) => {
            tasks::handle_done(bot, chat_id, user_id, &argument, &db).await?;
        }
        Command::Stats => {
            progress::handle_stats(bot, chat_id, user_id, &db).await?;
        }
        Command::Badges => {
            progress::handle_badges(bot, chat_id, user_id, &db).await?;
        }
    }
    Ok(())
}
