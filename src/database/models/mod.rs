pub mod badge;
pub mod scheduled_event;
pub mod study_session;
pub mod task;
pub mod user;

pub use badge::*;
pub use scheduled_event::*;
pub use study_session::*;
pub use task::*;
pub use user::*;
