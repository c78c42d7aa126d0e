use traffic_light_config::load_config;
use traffic_light_config::shared::SimulatorConfig;

/// Loads the simulator configuration for the current `APP_ENVIRONMENT`.
pub fn load_simulator_config() -> anyhow::Result<SimulatorConfig> {
    let config = load_config::<SimulatorConfig>()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use traffic_light_config::shared::SimulatorConfig;
    use traffic_light_config::{Environment, load_config_from};

    fn configuration_dir() -> &'static Path {
        Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/configuration"))
    }

    #[test]
    fn test_dev_configuration_is_bounded() {
        let config: SimulatorConfig =
            load_config_from(configuration_dir(), &Environment::Dev).unwrap();

        assert_eq!(config.waiters.count, 2);
        assert_eq!(config.waiters.crossings, Some(3));
        assert_eq!(config.waiters.poll_interval_ms, 250);
    }

    #[test]
    fn test_prod_configuration_runs_until_stopped() {
        let config: SimulatorConfig =
            load_config_from(configuration_dir(), &Environment::Prod).unwrap();

        assert_eq!(config.waiters.count, 4);
        assert_eq!(config.waiters.crossings, None);
    }
}
