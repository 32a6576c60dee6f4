pub mod operations;
pub mod paging;

pub use crate::{
    config::{operations::OperationsConfig, paging::PagingConfig},
    defaults,
};
pub use clap::{Args, Parser};
use std::{
    fs::File,
    io::Error,
    path::{Path, PathBuf},
};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

/// Error type returned by configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error parsing env variables from config")]
    EnvVarParseError(#[from] std::env::VarError),
    #[error("Invalid value for env variable {0}: {1:?}")]
    InvalidEnvVar(String, String),
    #[error("Error processing file: {0:?}")]
    ConfigFileError(#[from] Error),
    #[error("Error processing YAML file: {0:?}")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("Invalid value for config key {0:?}")]
    InvalidConfigValue(String),
}

/// Result type returned by configuration operations.
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Set of environment variables that override file and CLI settings.
#[derive(Debug, EnumString, AsRefStr)]
pub enum EnvVar {
    #[strum(serialize = "CONNECTION_DEFAULT_LIMIT")]
    DefaultLimit,
    #[strum(serialize = "CONNECTION_MAX_LIMIT")]
    MaxLimit,
}

/// Return the value of an environment variable, if it is set.
pub fn env_opt(var: EnvVar) -> Option<String> {
    std::env::var(var.as_ref()).ok()
}

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "GraphQL Connection",
    about = "Run a paginated connection query against a JSON record set.",
    version
)]
pub struct ConnectionArgs {
    /// Log level passed to the connection resolver.
    #[clap(long, default_value = defaults::LOG_LEVEL, value_parser(["info", "debug", "error", "warn", "trace"]), help = "Log level passed to the connection resolver.")]
    pub log_level: String,

    /// Connection config file.
    #[clap(short, long, value_name = "FILE", help = "Connection config file.")]
    pub config: Option<PathBuf>,

    /// Name of the count operation on the host type.
    #[clap(
        long,
        help = "Name of the count operation on the host type.",
        default_value = defaults::COUNT_RESOLVER_NAME
    )]
    pub count_resolver_name: String,

    /// Name of the find-many operation on the host type.
    #[clap(
        long,
        help = "Name of the find-many operation on the host type.",
        default_value = defaults::FIND_RESOLVER_NAME
    )]
    pub find_resolver_name: String,

    /// Page size used when neither `first` nor `last` is provided.
    #[clap(long, help = "Page size used when neither `first` nor `last` is provided.", default_value_t = defaults::DEFAULT_LIMIT)]
    pub default_limit: u64,

    /// Upper bound applied to every page size.
    #[clap(long, help = "Upper bound applied to every page size.")]
    pub max_limit: Option<u64>,

    /// Enable verbose logging.
    #[clap(short, long, help = "Enable verbose logging.")]
    pub verbose: bool,
}

impl Default for ConnectionArgs {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            config: None,
            count_resolver_name: defaults::COUNT_RESOLVER_NAME.to_string(),
            find_resolver_name: defaults::FIND_RESOLVER_NAME.to_string(),
            default_limit: defaults::DEFAULT_LIMIT,
            max_limit: None,
            verbose: defaults::VERBOSE_LOGGING,
        }
    }
}

pub trait Env {
    fn inject_opt_env_vars(&mut self) -> ConfigResult<()>;
}

/// Connection resolver configuration.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    pub log_level: String,
    pub verbose: bool,
    pub operations: OperationsConfig,
    pub paging: PagingConfig,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::LOG_LEVEL.to_string(),
            verbose: defaults::VERBOSE_LOGGING,
            operations: OperationsConfig::default(),
            paging: PagingConfig::default(),
        }
    }
}

impl TryFrom<ConnectionArgs> for ConnectionConfig {
    type Error = ConfigError;

    fn try_from(args: ConnectionArgs) -> ConfigResult<Self> {
        let mut config = match &args.config {
            Some(path) => ConnectionConfig::from_file(path)?,
            None => ConnectionConfig {
                log_level: args.log_level,
                verbose: args.verbose,
                operations: OperationsConfig {
                    count_resolver_name: args.count_resolver_name,
                    find_resolver_name: args.find_resolver_name,
                },
                paging: PagingConfig {
                    default_limit: args.default_limit,
                    max_limit: args.max_limit,
                },
            },
        };

        config.inject_opt_env_vars()?;

        Ok(config)
    }
}

impl ConnectionConfig {
    // When building the config via a file, if any section (e.g., paging, operations),
    // or if any individual setting in a section (e.g., paging.default_limit) is empty,
    // replace it with its respective default value.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let file = File::open(path)?;

        let mut config = ConnectionConfig::default();

        let content: serde_yaml::Value = serde_yaml::from_reader(file)?;

        let log_level_key = serde_yaml::Value::String("log_level".into());
        let verbose_key = serde_yaml::Value::String("verbose".into());

        if let Some(log_level) = content.get(log_level_key) {
            config.log_level = log_level
                .as_str()
                .ok_or_else(|| ConfigError::InvalidConfigValue("log_level".into()))?
                .to_string();
        }

        if let Some(verbose) = content.get(verbose_key) {
            config.verbose = verbose
                .as_bool()
                .ok_or_else(|| ConfigError::InvalidConfigValue("verbose".into()))?;
        }

        let operations_config_key = serde_yaml::Value::String("operations".into());
        let paging_config_key = serde_yaml::Value::String("paging".into());

        if let Some(section) = content.get(operations_config_key) {
            config.operations.supplement(section)?;
        }

        if let Some(section) = content.get(paging_config_key) {
            config.paging.supplement(section)?;
        }

        Ok(config)
    }
}

impl Env for ConnectionConfig {
    fn inject_opt_env_vars(&mut self) -> ConfigResult<()> {
        self.operations.inject_opt_env_vars()?;
        self.paging.inject_opt_env_vars()?;
        Ok(())
    }
}
