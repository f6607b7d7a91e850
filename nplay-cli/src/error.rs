use thiserror::Error;

use nplay_config::ConfigError;
use nplay_engine::EngineError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to initialise logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] serde_yaml::Error),
}
