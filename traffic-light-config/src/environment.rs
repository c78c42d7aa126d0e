use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Variable selecting the environment the simulator runs in.
const APP_ENVIRONMENT_ENV_NAME: &str = "APP_ENVIRONMENT";

/// Runtime environment for the simulator.
///
/// Selects which configuration file is loaded and how logs are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Prod,
    Staging,
    Dev,
}

/// Returned when `APP_ENVIRONMENT` names an environment the simulator doesn't know.
#[derive(Debug, Error)]
#[error("{0} is not a supported environment, use one of `prod`, `staging` or `dev`")]
pub struct UnknownEnvironment(String);

impl Environment {
    const ALL: [Environment; 3] = [Environment::Prod, Environment::Staging, Environment::Dev];

    /// Reads the environment from `APP_ENVIRONMENT`, falling back to [`Environment::Prod`].
    pub fn load() -> Result<Environment, UnknownEnvironment> {
        Self::from_var(std::env::var(APP_ENVIRONMENT_ENV_NAME).ok().as_deref())
    }

    /// Resolves the value of `APP_ENVIRONMENT`, `None` meaning the variable is unset.
    pub fn from_var(value: Option<&str>) -> Result<Environment, UnknownEnvironment> {
        value.map_or(Ok(Environment::Prod), str::parse)
    }

    /// Name used in `APP_ENVIRONMENT` and as the configuration file stem.
    pub const fn as_str(self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Staging => "staging",
            Environment::Dev => "dev",
        }
    }

    /// Production-like environments log JSON to files instead of the terminal.
    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod | Self::Staging)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|environment| environment.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownEnvironment(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!(
            "Staging".parse::<Environment>().unwrap(),
            Environment::Staging
        );
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
    }

    #[test]
    fn test_parse_rejects_unknown_environment() {
        let err = "qa".parse::<Environment>().unwrap_err();
        assert!(err.to_string().starts_with("qa is not a supported environment"));
    }

    #[test]
    fn test_unset_variable_means_prod() {
        assert_eq!(Environment::from_var(None).unwrap(), Environment::Prod);
        assert_eq!(
            Environment::from_var(Some("dev")).unwrap(),
            Environment::Dev
        );
        assert!(Environment::from_var(Some("")).is_err());
    }

    #[test]
    fn test_staging_is_prod_like() {
        assert!(Environment::Prod.is_prod());
        assert!(Environment::Staging.is_prod());
        assert!(!Environment::Dev.is_prod());
    }
}
