pub mod callback_data;
pub mod commands;
pub mod conversation;
pub mod handlers;
pub mod keyboards;
