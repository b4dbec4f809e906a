//! Application startup and orchestration
//!
//! Loads configuration, starts logging, builds the client's context and runs
//! the simulated library against a current-thread host loop until the
//! library is idle or a signal arrives.

use crate::app::cli::Args;
use crate::app::host::{HostLoop, HostOutcome};
use crate::app::registry::CallbackTable;
use crate::app::simulator::{LibrarySimulator, LibraryThreads, ProducerTally, SimulatedClient};
use crate::app::summary::RunSummary;
use crate::callbacks::api::OpaqueRef;
use crate::config::{BridgeConfig, ConfigError};
use crate::context::{ContextError, ContextResult, EventQueues, HostRegistry};
use crate::core::error_handling::{log_error_with_context, ContextualError};
use crate::core::logging::init_from_settings;
use crate::core::shutdown::ShutdownCoordinator;
use crate::events::Event;
use clap::Parser;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),

    #[error("Failed to start runtime or library threads: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Failed to encode summary: {0}")]
    Summary(#[from] serde_json::Error),
}

impl ContextualError for StartupError {
    fn is_user_actionable(&self) -> bool {
        match self {
            StartupError::Config(err) => err.is_user_actionable(),
            StartupError::Logging(_) => true,
            _ => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            StartupError::Config(err) => err.user_message(),
            StartupError::Logging(message) => Some(message),
            _ => None,
        }
    }
}

/// Entry point for the binary
pub fn startup() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        log_error_with_context(&err, "kafka-bridge run failed");
        // logging may not have started yet
        if !log::log_enabled!(log::Level::Error) {
            eprintln!("Error: {}", err);
        }
        std::process::exit(1);
    }
}

/// Load configuration and apply command-line overrides
pub fn resolve_config(args: &Args) -> Result<BridgeConfig, StartupError> {
    let mut config = BridgeConfig::load(args.config_file.as_deref())?;
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<(), StartupError> {
    let config = resolve_config(&args)?;
    let use_color = config.logging.color.unwrap_or_else(|| args.use_color());
    init_from_settings(&config.logging, use_color)
        .map_err(|err| StartupError::Logging(err.to_string()))?;
    log::info!("{}", crate::core::version::version_line());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let summary = runtime.block_on(run_bridge(&args, &config))?;

    if args.json {
        println!("{}", summary.to_json()?);
    } else {
        println!("{}", summary.render_text(use_color));
    }
    Ok(())
}

/// Run one simulated client end to end and report on it
pub async fn run_bridge(args: &Args, config: &BridgeConfig) -> Result<RunSummary, StartupError> {
    let mut callables = CallbackTable::new();
    let log_ref = callables.register(|_: &Event| {});
    let error_ref = callables.register(|event: &Event| {
        if let Event::Error(error) = event {
            log::debug!("Host error callable saw {}", error.code());
        }
    });
    let delivery_ref = callables.register(|event: &Event| {
        if let Event::Delivery(delivery) = event {
            if !delivery.is_delivered() {
                log::debug!("Delivery failed: {}", delivery.code());
            }
        }
    });

    let mut queues = EventQueues::from_settings(&config.queues);
    queues.register_log_callback(log_ref);
    queues.register_error_callback(error_ref);
    let context = queues.activate();

    let simulator = LibrarySimulator {
        threads: args.threads,
        messages_per_thread: args.messages,
        failure_rate: args.failure_rate,
        delivery_callback_id: Some(delivery_ref.slot()),
    };
    let client = SimulatedClient::new("client-1", OpaqueRef::new(&context));
    let host_settings = config.host.clone();

    ShutdownCoordinator::guard_with_coordinator(|coordinator, mut shutdown_rx| async move {
        let library = simulator.spawn(client, coordinator.flag())?;
        let mut host = HostLoop::new(context, callables, &host_settings);

        let polled = host.run(&mut shutdown_rx, || library.is_finished()).await;
        let interrupted = coordinator.is_shutdown_requested();

        let (produced, outcome, mut callables) = wind_down(&coordinator, library, host, polled)?;
        callables.release(delivery_ref);
        log::debug!("{} host callable(s) still registered", callables.live());

        let summary = RunSummary::new(produced, outcome, interrupted);
        if summary.reports_lost() > 0 {
            log::warn!("{} delivery report(s) were dropped", summary.reports_lost());
        }
        Ok::<_, StartupError>(summary)
    })
    .await
}

/// Stop the library threads, then drain and destroy the client's context
///
/// Runs on every exit from the host loop. A loop failure is returned only
/// once the threads are joined and the context is gone.
pub(crate) fn wind_down(
    coordinator: &ShutdownCoordinator,
    library: LibraryThreads,
    host: HostLoop,
    polled: ContextResult<()>,
) -> Result<(ProducerTally, HostOutcome, CallbackTable), StartupError> {
    // the client must be stopped before its context is torn down
    coordinator.trigger_shutdown();
    let produced = library.join();
    let finished = host.finish();

    if let Err(err) = polled {
        log::error!("Host loop failed after {} produced message(s): {}", produced.produced, err);
        return Err(err.into());
    }
    let (outcome, callables) = finished?;
    Ok((produced, outcome, callables))
}
