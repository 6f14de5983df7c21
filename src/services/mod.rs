pub mod health;
pub mod notifier;
pub mod planner;
pub mod rewards;
pub mod scheduler;
pub mod session_handlers;
