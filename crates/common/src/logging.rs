//! Logging and tracing initialization.

use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::MontageResult;

/// Initialize the tracing subscriber from a [`LoggingConfig`].
///
/// `RUST_LOG` wins when set. Otherwise a bare level name ("info",
/// "debug") is scoped to the montage crates with dependencies held at
/// warn; strings containing explicit directives pass through unchanged.
/// When `config.file` is set, output goes there instead of stderr.
pub fn init_logging(config: &LoggingConfig) -> MontageResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| workspace_filter(&config.level));

    let writer = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Some(Arc::new(File::create(path)?))
        }
        None => None,
    };

    match (config.json, writer) {
        (true, Some(file)) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (true, None) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (false, Some(file)) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
        (false, None) => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber).ok();
        }
    }
    Ok(())
}

/// Scope a bare level name to the montage crates; anything that already
/// contains directives is used as-is.
fn workspace_filter(level: &str) -> EnvFilter {
    if level.contains('=') || level.contains(',') {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(format!(
            "warn,montage={level},montage_common={level},montage_timeline_model={level},\
             montage_editor_engine={level},montage_render_orchestrator={level}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_scopes_to_workspace_crates() {
        let filter = workspace_filter("debug").to_string();
        assert!(filter.contains("montage_timeline_model=debug"));
        assert!(filter.contains("montage_editor_engine=debug"));
        assert!(filter.contains("warn"));
    }

    #[test]
    fn test_directive_string_passes_through() {
        let filter = workspace_filter("montage_editor_engine=trace,warn").to_string();
        assert!(filter.contains("montage_editor_engine=trace"));
        assert!(!filter.contains("montage_timeline_model"));
    }

    #[test]
    fn test_file_output_creates_log_file() {
        let dir = std::env::temp_dir().join("montage_test_log_file");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("montage.log");

        init_logging(&LoggingConfig {
            level: "info".to_string(),
            json: false,
            file: Some(path.clone()),
        })
        .unwrap();
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
