pub mod cmd;
pub mod config;

pub use cmd::{Commands, OrchestratorCli};
pub use config::{ConfigError, OrchestratorConfig};
