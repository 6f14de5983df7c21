pub mod callback;
pub mod general_message;
pub mod message;

use teloxide::{dispatching::UpdateHandler, prelude::*};
use crate::bot::commands::Command;
use crate::bot::conversation::ConversationStorage;
use crate::database::connection::DatabaseManager;
use crate::services::scheduler::SchedulerGateway;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

pub struct BotHandler {
    pub db: DatabaseManager,
    pub gateway: SchedulerGateway,
}

impl BotHandler {
    pub fn new(db: DatabaseManager, gateway: SchedulerGateway) -> Self {
        Self { db, gateway }
    }

    /// Dispatch tree. Expects a [`ConversationStorage`] among the dependencies.
    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        let db = self.db.clone();
        let db_text = self.db.clone();
        let gateway_text = self.gateway.clone();
        
        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command, storage: ConversationStorage| {
                        let db = db.clone();
                        async move { message::command_handler(bot, msg, cmd, db, storage).await }
                    }),
            )
            .branch(
                Update::filter_message().endpoint(move |bot: Bot, msg: Message, storage: ConversationStorage| {
                    let db = db_text.clone();
                    let gateway = gateway_text.clone();
                    async move { general_message::handle_general_message(bot, msg, db, gateway, storage).await }
                }),
            )
            .branch(Update::filter_callback_query().endpoint(
                |bot: Bot, q: CallbackQuery, storage: ConversationStorage| async move {
                    callback::callback_handler(bot, q, storage).await
                },
            ))
    }
}
