use crate::config::ConnectionConfig;
use anyhow::{anyhow, Result};
use std::{env, str::FromStr};
use tracing_subscriber::filter::EnvFilter;

const RUST_LOG: &str = "RUST_LOG";
const HUMAN_LOGGING: &str = "HUMAN_LOGGING";

/// Build the log filter directive for the given configuration.
///
/// `RUST_LOG` wins when it is set. Otherwise the configured level is used, and
/// unless `verbose` is set the async-graphql internals are held at `warn`.
pub fn log_directive(config: &ConnectionConfig, rust_log: Option<String>) -> String {
    match rust_log {
        Some(directive) => directive,
        None if config.verbose => config.log_level.clone(),
        None => format!("{},async_graphql=warn", config.log_level),
    }
}

/// Initialize the logging context for the connection resolver.
pub fn init_logging(config: &ConnectionConfig) -> Result<()> {
    let rust_log = env::var_os(RUST_LOG)
        .map(|x| {
            x.into_string()
                .map_err(|_| anyhow!("`{RUST_LOG}` is not valid unicode"))
        })
        .transpose()?;

    let filter = EnvFilter::try_new(log_directive(config, rust_log))
        .map_err(|e| anyhow!("Invalid log directive provided: {e}"))?;

    let human_logging = env::var_os(HUMAN_LOGGING)
        .map(|s| {
            s.to_str()
                .and_then(|s| bool::from_str(s).ok())
                .ok_or_else(|| {
                    anyhow!("Expected `true` or `false` to be provided for `{HUMAN_LOGGING}`")
                })
        })
        .transpose()?
        .unwrap_or(true);

    let sub = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if human_logging {
        sub.with_ansi(true)
            .with_level(true)
            .with_line_number(true)
            .try_init()
            .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))?;
    } else {
        sub.with_ansi(false)
            .with_level(true)
            .with_line_number(true)
            .json()
            .try_init()
            .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_log_directive_prefers_rust_log() {
        let config = ConnectionConfig::default();
        assert_eq!(
            log_directive(&config, Some("trace".to_string())),
            "trace".to_string()
        );
    }

    #[test]
    fn test_log_directive_quiets_dependencies_unless_verbose() {
        let mut config = ConnectionConfig::default();
        assert_eq!(
            log_directive(&config, None),
            "info,async_graphql=warn".to_string()
        );

        config.verbose = true;
        config.log_level = "debug".to_string();
        assert_eq!(log_directive(&config, None), "debug".to_string());
    }
}
