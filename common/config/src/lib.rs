//! Settings for askgpt.
//!
//! Settings live in `config.json` inside the askgpt home directory
//! (`~/.askgpt`, or `$ASKGPT_HOME`). A missing file means defaults.
//! [`Settings::request_config`] turns the stored settings into the read-only
//! [`RequestConfig`] snapshot a conversation call consumes.

pub mod error;
pub mod game_system;
pub mod loader;
pub mod settings;

pub use error::ConfigError;
pub use error::Result;
pub use game_system::GameSystem;
pub use loader::ConfigLoader;
pub use loader::find_askgpt_home;
pub use settings::ConfigMode;
pub use settings::RequestConfig;
pub use settings::Settings;
