//! Request and response types for the OpenAI API.

mod assistants;
mod chat;

pub use assistants::CreateMessageParams;
pub use assistants::CreateRunParams;
pub use assistants::MessageContent;
pub use assistants::MessageList;
pub use assistants::MessageTextContent;
pub use assistants::Run;
pub use assistants::RunError;
pub use assistants::RunStatus;
pub use assistants::Thread;
pub use assistants::ThreadMessage;
pub use chat::ChatChoice;
pub use chat::ChatCompletion;
pub use chat::ChatCompletionParams;
pub use chat::ChatMessage;
pub use chat::CompletionMessage;
pub use chat::Role;
pub use chat::Usage;
