use crate::config::load_simulator_config;
use crate::core::start_simulator_with_config;
use traffic_light_config::shared::SimulatorConfig;
use traffic_light_telemetry::init_tracing;
use tracing::error;

mod config;
mod core;

fn main() -> anyhow::Result<()> {
    let simulator_config = load_simulator_config()?;

    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(simulator_config))?;

    Ok(())
}

async fn async_main(simulator_config: SimulatorConfig) -> anyhow::Result<()> {
    if let Err(err) = start_simulator_with_config(simulator_config).await {
        error!("an error occurred in the simulator: {err:#}");

        return Err(err);
    }

    Ok(())
}
