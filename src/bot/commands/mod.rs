pub mod challenge;
pub mod progress;
pub mod tasks;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "TreloxBot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot and show the main menu")]
    Start,
    #[command(description = "Start a new study challenge")]
    Challenge,
    #[command(description = "Show your to-do list")]
    Tasks,
    #[command(description = "Add a task to your to-do list")]
    AddTask,
    #[command(description = "Mark a task as done: /donetask <id>")]
    DoneTask(String),
    #[command(description = "Show your study time and points")]
    Stats,
    #[command(description = "Show your badges")]
    Badges,
}
