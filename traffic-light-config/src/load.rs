use serde::de::DeserializeOwned;
use std::path::Path;

use crate::environment::Environment;

/// Directory containing configuration files relative to application root.
const CONFIGURATION_DIR: &str = "configuration";

/// Base configuration file loaded for all environments.
const BASE_CONFIG_FILE: &str = "base.yaml";

/// Prefix for environment variable configuration overrides.
const ENV_PREFIX: &str = "APP";

/// Separator between environment variable prefix and key segments.
const ENV_PREFIX_SEPARATOR: &str = "_";

/// Separator for nested configuration keys in environment variables.
///
/// Example: `APP_WAITERS__COUNT` sets the `waiters.count` field.
const ENV_SEPARATOR: &str = "__";

/// Separator for list elements in environment variables.
const LIST_SEPARATOR: &str = ",";

/// Trait defining the list of keys that should be parsed as lists in a given [`Config`]
/// implementation.
pub trait Config {
    /// Slice containing all the keys that should be parsed as lists when loading the configuration.
    const LIST_PARSE_KEYS: &'static [&'static str];
}

/// Loads hierarchical configuration from YAML files and environment variables.
///
/// Loads configuration in this order:
/// 1. Base configuration from `configuration/base.yaml`
/// 2. Environment-specific file from `configuration/{environment}.yaml`
/// 3. Environment variable overrides prefixed with `APP`
///
/// Nested keys use double underscores: `APP_WAITERS__COUNT` → `waiters.count` and lists are
/// separated by `,`.
///
/// # Errors
/// Fails if the current directory can't be determined, if `APP_ENVIRONMENT` names an unknown
/// environment, or if the sources can't be read or deserialized into `T`.
pub fn load_config<T>() -> Result<T, config::ConfigError>
where
    T: Config + DeserializeOwned,
{
    let base_path =
        std::env::current_dir().map_err(|err| config::ConfigError::Foreign(Box::new(err)))?;
    let configuration_directory = base_path.join(CONFIGURATION_DIR);

    let environment =
        Environment::load().map_err(|err| config::ConfigError::Foreign(Box::new(err)))?;

    load_config_from(&configuration_directory, &environment)
}

/// Loads configuration like [`load_config`], from an explicit directory and environment.
pub fn load_config_from<T>(
    configuration_directory: &Path,
    environment: &Environment,
) -> Result<T, config::ConfigError>
where
    T: Config + DeserializeOwned,
{
    let environment_filename = format!("{environment}.yaml");

    // We build the environment configuration source.
    let mut environment_source = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_PREFIX_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true);

    // If there is a list of keys to parse, we add them to the source and enable parsing with the
    // separator.
    if !<T as Config>::LIST_PARSE_KEYS.is_empty() {
        environment_source = environment_source.list_separator(LIST_SEPARATOR);

        for key in <T as Config>::LIST_PARSE_KEYS {
            environment_source = environment_source.with_list_parse_key(key);
        }
    }

    let settings = config::Config::builder()
        // Add in settings from the base configuration file.
        .add_source(config::File::from(
            configuration_directory.join(BASE_CONFIG_FILE),
        ))
        // Add in settings from the environment-specific file.
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Add in settings from environment variables (with a prefix of APP and '__' as separator)
        // E.g. `APP_WAITERS__CROSSINGS=3` sets `SimulatorConfig { waiters: { crossings } }` to `3`.
        .add_source(environment_source)
        .build()?;

    settings.try_deserialize::<T>()
}
