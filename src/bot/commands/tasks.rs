use teloxide::prelude::*;

use crate::bot::conversation::{ConversationDialogue, ConversationState};
use crate::bot::handlers::HandlerResult;
use crate::database::{connection::DatabaseManager, models::Task};
use crate::utils::{
    feedback::CommandFeedback,
    logging::{log_database_error, log_validation_error},
    validation::parse_task_id,
};

pub fn render_tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks yet. Use /addtask to add one.".to_string();
    }
    
    let mut text = String::from("Your tasks:\n");
    for task in tasks {
        let status = if task.done { "✅" } else { "🔲" };
        text.push_str(&format!("{}. {} {}\n", task.id, status, task.title));
    }
    text
}

pub async fn handle_list(bot: Bot, chat_id: ChatId, user_id: i64, db: &DatabaseManager) -> ResponseResult<()> {
    match Task::find_by_user(&db.pool, user_id).await {
        Ok(tasks) => {
            bot.send_message(chat_id, render_tasks(&tasks)).await?;
        }
        Err(e) => {
            log_database_error("find_by_user", "tasks", &e.to_string());
            CommandFeedback::new(bot.clone(), chat_id)
                .error("Failed to load your tasks")
                .await?;
        }
    }
    Ok(())
}

pub async fn prompt_new_task(bot: &Bot, chat_id: ChatId, dialogue: &ConversationDialogue) -> HandlerResult {
    dialogue.update(ConversationState::AwaitingNewTaskTitle).await?;
    bot.send_message(chat_id, "Write the task title:").await?;
    Ok(())
}

pub async fn add_task(
    bot: &Bot,
    chat_id: ChatId,
    user_id: i64,
    title: &str,
    db: &DatabaseManager,
) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), chat_id);
    
    match Task::create(&db.pool, user_id, title).await {
        Ok(task) => {
            tracing::debug!("Created task {} for user {}", task.id, user_id);
            feedback.success("Task added").await?;
        }
        Err(e) => {
            log_database_error("create", "tasks", &e.to_string());
            feedback.error("Failed to save the task").await?;
        }
    }
    Ok(())
}

pub async fn handle_done(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    argument: &str,
    db: &DatabaseManager,
) -> ResponseResult<()> {
    let feedback = CommandFeedback::new(bot.clone(), chat_id);
    
    let task_id = match parse_task_id(argument) {
        Ok(id) => id,
        Err(e) => {
            log_validation_error("donetask", argument, &e.to_string(), user_id);
            feedback.validation_error(&e.to_string(), "Usage: /donetask <id>, see /tasks for ids").await?;
            return Ok(());
        }
    };
    
    match Task::mark_done(&db.pool, task_id, user_id).await {
        Ok(true) => {
            feedback.success("Task marked as done").await?;
        }
        Ok(false) => {
            feedback.warning(&format!("You have no task with id {task_id}")).await?;
        }
        Err(e) => {
            log_database_error("mark_done", "tasks", &e.to_string());
            feedback.error("Failed to update the task").await?;
        }
    }
    Ok(())
}
