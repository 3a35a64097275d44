//! openai-sdk - Rust SDK for the OpenAI chat-completions and assistants APIs.
//!
//! The client issues every request through a single retrying transport:
//! transient failures (network errors, HTTP 429 and 5xx) are retried with
//! exponential backoff and jitter, every other failure surfaces immediately.
//!
//! # Example
//!
//! ```no_run
//! use openai_sdk::{ChatCompletionParams, ChatMessage, Client};
//!
//! # async fn example() -> openai_sdk::Result<()> {
//! let client = Client::from_env()?;
//!
//! let params = ChatCompletionParams::new(
//!     "gpt-4o-mini",
//!     vec![
//!         ChatMessage::system("You are a game master."),
//!         ChatMessage::user("Roll for initiative!"),
//!     ],
//! );
//! let completion = client.chat().create(params).await?;
//! println!("{}", completion.text().unwrap_or_default());
//!
//! // Assistants: threads, messages and runs
//! let thread = client.threads().create().await?;
//! client.messages().create(&thread.id, "Hello!").await?;
//! let run = client.runs().create(&thread.id, "asst_123").await?;
//! let run = client.runs().retrieve(&thread.id, &run.id).await?;
//! println!("Run status: {:?}", run.status);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod resources;
pub mod retry;
pub mod telemetry;
pub mod types;

pub use client::ApiFamily;
pub use client::Client;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::TokioClock;
pub use config::ClientConfig;
pub use error::OpenAIError;
pub use error::Result;
pub use retry::RetryConfig;
pub use telemetry::LoggingTelemetry;
pub use telemetry::NoopTelemetry;
pub use telemetry::RequestTelemetry;
pub use types::ChatCompletion;
pub use types::ChatCompletionParams;
pub use types::ChatMessage;
pub use types::MessageList;
pub use types::Role;
pub use types::Run;
pub use types::RunStatus;
pub use types::Thread;
pub use types::ThreadMessage;
