use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use traffic_light::concurrency::shutdown::ShutdownRx;
use traffic_light::light::TrafficLight;
use traffic_light::timer::PhaseTimer;
use traffic_light::types::LightStatus;
use traffic_light_config::shared::{SimulatorConfig, WaitersConfig};

/// Starts the simulator with the provided configuration.
///
/// Runs a single randomly timed traffic light together with the configured waiters until either
/// every waiter finished or the process receives a termination signal.
pub async fn start_simulator_with_config(simulator_config: SimulatorConfig) -> anyhow::Result<()> {
    info!("starting traffic light simulator");

    log_config(&simulator_config);

    let light = Arc::new(TrafficLight::new());
    let crossings = run_simulation(light, simulator_config.waiters).await?;

    info!(crossings, "traffic light simulator completed");

    Ok(())
}

fn log_config(config: &SimulatorConfig) {
    log_waiters_config(&config.waiters);
}

fn log_waiters_config(config: &WaitersConfig) {
    debug!(
        count = config.count,
        crossings = config.crossings,
        poll_interval_ms = config.poll_interval_ms,
        "waiters config"
    );
}

/// Runs `light` with one blocking task per configured waiter.
///
/// Returns the total number of times waiters saw the light turn green. Whatever stopped the
/// simulation, including a failure to listen for signals or a failed waiter task, the light is
/// shut down and its worker joined before returning.
async fn run_simulation<T>(
    light: Arc<TrafficLight<T>>,
    waiters_config: WaitersConfig,
) -> anyhow::Result<u64>
where
    T: PhaseTimer + Send + 'static,
{
    run_simulation_until(light, waiters_config, wait_for_stop_signal()).await
}

/// Same as [`run_simulation`], with `stop_signal` resolving when the simulator must stop early.
#[tracing::instrument(skip_all, fields(waiters = waiters_config.count))]
async fn run_simulation_until<T, S>(
    light: Arc<TrafficLight<T>>,
    waiters_config: WaitersConfig,
    stop_signal: S,
) -> anyhow::Result<u64>
where
    T: PhaseTimer + Send + 'static,
    S: Future<Output = anyhow::Result<&'static str>>,
{
    let handle = light.simulate()?;
    let shutdown_tx = handle.shutdown_tx();

    let crossings = Arc::new(AtomicU64::new(0));
    let mut waiters = JoinSet::new();
    for waiter_id in 0..waiters_config.count {
        let light = light.clone();
        let shutdown_rx = shutdown_tx.subscribe();
        let waiters_config = waiters_config.clone();
        let crossings = crossings.clone();

        waiters.spawn_blocking(move || {
            run_waiter(waiter_id, &light, &shutdown_rx, &waiters_config, &crossings)
        });
    }

    if waiters.is_empty() {
        warn!("no waiters configured, the light runs until the simulator is stopped");
    }

    let stop = tokio::select! {
        signal = stop_signal => Stop::Signal(signal),
        result = join_waiters(&mut waiters), if !waiters.is_empty() => Stop::WaitersDone(result),
    };

    shutdown_tx.shutdown();

    // Waiters notice the shutdown within one poll interval.
    let waiters_result = match stop {
        Stop::WaitersDone(result) => {
            info!("all waiters finished, shutting down simulator");
            result
        }
        Stop::Signal(Ok(signal)) => {
            info!("{signal} received, shutting down simulator");
            join_waiters(&mut waiters).await
        }
        Stop::Signal(Err(err)) => {
            error!(error = %err, "failed to listen for stop signals, shutting down simulator");
            join_waiters(&mut waiters).await.and(Err(err))
        }
    };

    // Joining the worker thread blocks, so it must not run on the async workers.
    let light_result = tokio::task::spawn_blocking(move || handle.wait()).await;

    waiters_result?;
    light_result??;

    Ok(crossings.load(Ordering::SeqCst))
}

/// Why the simulation loop stopped.
enum Stop {
    Signal(anyhow::Result<&'static str>),
    WaitersDone(anyhow::Result<()>),
}

/// Waits for SIGINT or SIGTERM and returns a readable name of the received signal.
async fn wait_for_stop_signal() -> anyhow::Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            Ok("SIGINT (Ctrl+C)")
        }
        _ = sigterm.recv() => Ok("SIGTERM"),
    }
}

async fn join_waiters(waiters: &mut JoinSet<u32>) -> anyhow::Result<()> {
    while let Some(result) = waiters.join_next().await {
        result?;
    }

    Ok(())
}

/// Repeatedly waits for green until the waiter crossed often enough or shutdown is requested.
///
/// Returns the number of crossings of this waiter.
fn run_waiter<T>(
    waiter_id: u16,
    light: &TrafficLight<T>,
    shutdown_rx: &ShutdownRx,
    config: &WaitersConfig,
    total_crossings: &AtomicU64,
) -> u32
where
    T: PhaseTimer + Send + 'static,
{
    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let mut crossings = 0;

    debug!(waiter_id, "waiter started");

    while !shutdown_rx.is_shutdown() {
        if let Some(max_crossings) = config.crossings
            && crossings >= max_crossings
        {
            break;
        }

        if light.status() == LightStatus::Stopped {
            warn!(waiter_id, "light stopped toggling, waiter gives up");
            break;
        }

        if light.wait_for_green_timeout(poll_interval) {
            crossings += 1;
            total_crossings.fetch_add(1, Ordering::SeqCst);

            info!(waiter_id, crossings, "light is green, waiter crossing");
        }
    }

    debug!(waiter_id, crossings, "waiter finished");

    crossings
}
