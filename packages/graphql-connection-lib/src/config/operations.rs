use crate::{
    config::{ConfigError, ConfigResult, Env},
    defaults,
};

/// Names of the operations the resolver looks up on the host type.
#[derive(Clone, Debug)]
pub struct OperationsConfig {
    /// Name of the count operation.
    pub count_resolver_name: String,

    /// Name of the find-many operation.
    pub find_resolver_name: String,
}

impl Default for OperationsConfig {
    fn default() -> Self {
        Self {
            count_resolver_name: defaults::COUNT_RESOLVER_NAME.into(),
            find_resolver_name: defaults::FIND_RESOLVER_NAME.into(),
        }
    }
}

impl OperationsConfig {
    pub(crate) fn supplement(&mut self, section: &serde_yaml::Value) -> ConfigResult<()> {
        let count_key = serde_yaml::Value::String("count_resolver_name".into());
        let find_key = serde_yaml::Value::String("find_resolver_name".into());

        if let Some(name) = section.get(&count_key) {
            self.count_resolver_name = name
                .as_str()
                .ok_or_else(|| {
                    ConfigError::InvalidConfigValue(
                        "operations.count_resolver_name".into(),
                    )
                })?
                .to_string();
        }

        if let Some(name) = section.get(&find_key) {
            self.find_resolver_name = name
                .as_str()
                .ok_or_else(|| {
                    ConfigError::InvalidConfigValue(
                        "operations.find_resolver_name".into(),
                    )
                })?
                .to_string();
        }

        Ok(())
    }
}

impl Env for OperationsConfig {
    fn inject_opt_env_vars(&mut self) -> ConfigResult<()> {
        Ok(())
    }
}
