//! Diagnostic logging setup. Everything goes to stderr; stdout belongs to
//! the harness protocol.

use crate::config::{LogFormat, LoggingConfig};
use anyhow::Result;
use std::io;
use tracing_subscriber::EnvFilter;

/// Level the ONNX Runtime's own diagnostics are held at
const RUNTIME_DIRECTIVE: &str = "ort=error";

/// Install the global subscriber, honouring `RUST_LOG` when it is set
pub fn init(logging: &LoggingConfig) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = build_filter(rust_log.as_deref(), &logging.level)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }

    Ok(())
}

/// `RUST_LOG` directives take precedence over the configured level.
///
/// The runtime stays at `error` unless the directives name `ort` themselves.
pub fn build_filter(rust_log: Option<&str>, level: &str) -> Result<EnvFilter> {
    let directives = match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ => level,
    };

    let filter = EnvFilter::try_new(directives)?;
    if names_runtime(directives) {
        Ok(filter)
    } else {
        Ok(filter.add_directive(RUNTIME_DIRECTIVE.parse()?))
    }
}

/// Whether any directive targets the `ort` crate or one of its modules
fn names_runtime(directives: &str) -> bool {
    directives.split(',').any(|directive| {
        let target = directive
            .trim()
            .split(['=', '['])
            .next()
            .unwrap_or_default();
        target == "ort" || target.starts_with("ort::")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_pins_runtime() {
        let filter = build_filter(None, "warn").unwrap().to_string();
        assert!(filter.contains("ort=error"));
        assert!(filter.contains("warn"));
    }

    #[test]
    fn test_rust_log_without_runtime_keeps_pin() {
        let filter = build_filter(Some("info"), "warn").unwrap().to_string();
        assert!(filter.contains("ort=error"));
        assert!(filter.contains("info"));
        assert!(!filter.contains("warn"));
    }

    #[test]
    fn test_rust_log_naming_runtime_wins() {
        let filter = build_filter(Some("info,ort=debug"), "warn").unwrap().to_string();
        assert!(filter.contains("ort=debug"));
        assert!(!filter.contains("ort=error"));
    }

    #[test]
    fn test_blank_rust_log_falls_back_to_level() {
        let filter = build_filter(Some("  "), "debug").unwrap().to_string();
        assert!(filter.contains("debug"));
        assert!(filter.contains("ort=error"));
    }

    #[test]
    fn test_names_runtime() {
        assert!(names_runtime("ort"));
        assert!(names_runtime("info, ort::session=trace"));
        assert!(names_runtime("ort[run]=debug"));
        assert!(!names_runtime("info"));
        assert!(!names_runtime("inference_runner=debug,ortho=info"));
    }

    #[test]
    fn test_invalid_level_rejected() {
        assert!(build_filter(None, "loud=not_a_level").is_err());
    }
}
