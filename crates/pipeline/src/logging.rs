//! Tracing subscriber installation

use crate::config::LoggingConfig;
use crate::error::PipelineError;
use tracing_subscriber::FmtSubscriber;

/// Install the global tracing subscriber described by `config`.
///
/// Fails if the level is unknown or a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), PipelineError> {
    let level = config.max_level()?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(config.show_target);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    installed.map_err(|e| PipelineError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_level_rejected() {
        let config = LoggingConfig {
            level: "loud".into(),
            ..LoggingConfig::default()
        };
        assert!(matches!(init_logging(&config), Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_second_install_fails() {
        let config = LoggingConfig::default();
        // The first call may lose the race with another test; the second never succeeds
        let _ = init_logging(&config);
        assert!(matches!(init_logging(&config), Err(PipelineError::Logging(_))));
    }
}
