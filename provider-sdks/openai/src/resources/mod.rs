//! API resources.

mod chat;
mod messages;
mod runs;
mod threads;

pub use chat::Chat;
pub use messages::Messages;
pub use runs::Runs;
pub use threads::Threads;
