use crate::{
    config::{env_opt, ConfigError, ConfigResult, Env, EnvVar},
    defaults,
};

/// Page size settings applied to every connection query.
#[derive(Clone, Debug)]
pub struct PagingConfig {
    /// Page size used when neither `first` nor `last` is provided, or both are zero.
    pub default_limit: u64,

    /// Upper bound applied to every page size.
    pub max_limit: Option<u64>,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_limit: defaults::DEFAULT_LIMIT,
            max_limit: None,
        }
    }
}

impl PagingConfig {
    pub(crate) fn supplement(&mut self, section: &serde_yaml::Value) -> ConfigResult<()> {
        let default_limit_key = serde_yaml::Value::String("default_limit".into());
        let max_limit_key = serde_yaml::Value::String("max_limit".into());

        if let Some(default_limit) = section.get(&default_limit_key) {
            self.default_limit = default_limit.as_u64().ok_or_else(|| {
                ConfigError::InvalidConfigValue("paging.default_limit".into())
            })?;
        }

        if let Some(max_limit) = section.get(&max_limit_key) {
            self.max_limit = Some(max_limit.as_u64().ok_or_else(|| {
                ConfigError::InvalidConfigValue("paging.max_limit".into())
            })?);
        }

        Ok(())
    }
}

impl Env for PagingConfig {
    /// Inject environment variables into `PagingConfig`.
    fn inject_opt_env_vars(&mut self) -> ConfigResult<()> {
        if let Some(value) = env_opt(EnvVar::DefaultLimit) {
            self.default_limit = value.parse().map_err(|_| {
                ConfigError::InvalidEnvVar(
                    EnvVar::DefaultLimit.as_ref().to_string(),
                    value.clone(),
                )
            })?;
        }

        if let Some(value) = env_opt(EnvVar::MaxLimit) {
            self.max_limit = Some(value.parse().map_err(|_| {
                ConfigError::InvalidEnvVar(
                    EnvVar::MaxLimit.as_ref().to_string(),
                    value.clone(),
                )
            })?);
        }

        Ok(())
    }
}
