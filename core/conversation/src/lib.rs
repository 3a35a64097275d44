//! Conversation continuity for askgpt.
//!
//! A [`Conversation`] answers questions in one of two ways:
//!
//! - **stateless**: a chat completion carrying the system prompt, the most
//!   recent turns from the [`HistoryStore`] and the question;
//! - **stateful**: the question is posted to a server-side thread cached per
//!   assistant in the [`ThreadCache`], and the [`RunPoller`] waits for the
//!   assistant run to finish.
//!
//! All requests go through the retrying `openai-sdk` client.

pub mod error;
pub mod formatter;
pub mod history;
pub mod license;
pub mod orchestrator;
pub mod poller;
pub mod thread_cache;

pub use error::ConversationError;
pub use error::Result;
pub use formatter::ReplyFormat;
pub use history::HistoryStore;
pub use history::Turn;
pub use license::LicenseStatus;
pub use license::LicenseValidator;
pub use license::PendingLicenseValidator;
pub use orchestrator::Conversation;
pub use orchestrator::Reply;
pub use orchestrator::Route;
pub use poller::PollConfig;
pub use poller::RunPoller;
pub use thread_cache::ThreadCache;
