// Framework bootstrap: tracing, config, sockets, and the active loop.

use crate::domain::ClockFault;
use crate::domain::geodetic::Wgs84;
use crate::domain::ports::{Clock, PduSink};
use crate::domain::tuning::events::EventTuning;
use crate::domain::tuning::spawn::SpawnTuning;
use crate::frameworks::{config, db};
use crate::interface_adapters::net::UdpTransport;
use crate::interface_adapters::persistence::PgPduSink;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::{
    LoopSettings, PduCounters, RunMode, Simulation, run_listener, run_simulation,
};

use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Anything that stops the process before or during its main loop.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {socket} on {address}: {source}")]
    Bind {
        socket: &'static str,
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Clock(#[from] ClockFault),
}

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves `/health` and `/stats` until the task is dropped.
pub async fn serve_status(
    listener: tokio::net::TcpListener,
    state: AppState,
) -> std::io::Result<()> {
    let address = listener.local_addr()?;
    tracing::info!(%address, "status api listening");

    axum::serve(listener, app(state)).await.inspect_err(|e| {
        tracing::error!(error = %e, "status server error");
    })
}

pub async fn run_with_config() -> Result<(), StartupError> {
    init_runtime();

    let mode = config::mode();
    let counters = Arc::new(PduCounters::default());

    let status_address = SocketAddr::from(([127, 0, 0, 1], config::status_port()));
    let status_listener = tokio::net::TcpListener::bind(status_address)
        .await
        .map_err(|source| bind_error("status api", status_address, source))?;
    let status = tokio::spawn(serve_status(
        status_listener,
        AppState {
            counters: counters.clone(),
            mode,
        },
    ));

    let shutdown = Arc::new(Notify::new());
    spawn_ctrl_c(shutdown.clone());

    info!(mode = mode.as_str(), "starting");
    let result = match mode {
        RunMode::Simulate => simulate(&counters, shutdown).await,
        RunMode::Listen => listen(&counters, shutdown).await,
    };

    status.abort();
    result
}

async fn simulate(counters: &PduCounters, shutdown: Arc<Notify>) -> Result<(), StartupError> {
    let settings = config::simulation_settings();
    let clock = SystemClock;
    // Fail before any socket work if the wall clock is unusable.
    clock.timestamp()?;

    let destination = config::destination();
    let transport = UdpTransport::bind_sender(destination)
        .await
        .map_err(|source| bind_error("dis sender", destination, source))?;

    let mut sim = Simulation::from_settings(
        &settings,
        &SpawnTuning::default(),
        EventTuning::default(),
        &Wgs84,
    );
    info!(
        %destination,
        version = settings.protocol_version,
        exercise = settings.exercise_id,
        site = settings.site_id,
        application = settings.application_id,
        entities = sim.roster().len(),
        rate_hz = settings.target_rate,
        "simulator configured"
    );

    let summary = run_simulation(
        &mut sim,
        &transport,
        &clock,
        counters,
        LoopSettings {
            tick_interval: settings.tick_interval,
            duration: settings.duration,
        },
        shutdown,
    )
    .await?;

    for kind in crate::domain::PduKind::ALL {
        let sent = summary.sent(kind);
        if sent > 0 {
            debug!(pdu = kind.name(), sent, "sent by kind");
        }
    }
    Ok(())
}

async fn listen(counters: &PduCounters, shutdown: Arc<Notify>) -> Result<(), StartupError> {
    let address = SocketAddr::from(([0, 0, 0, 0], config::listen_port()));
    let transport = UdpTransport::bind_listener(address)
        .await
        .map_err(|source| bind_error("dis listener", address, source))?;

    let sink = match config::database_url() {
        Some(url) => {
            let pool = db::connect_pool(&url).await.inspect_err(|e| {
                tracing::error!(error = %e, "failed to connect to database");
            })?;
            db::run_migrations(&pool).await.inspect_err(|e| {
                tracing::error!(error = %e, "failed to run migrations");
            })?;
            info!("pdu sink enabled");
            Some(PgPduSink::new(pool))
        }
        None => None,
    };

    info!(%address, "dis listener bound");
    run_listener(
        &transport,
        counters,
        sink.as_ref().map(|s| s as &dyn PduSink),
        shutdown,
    )
    .await;
    Ok(())
}

fn bind_error(socket: &'static str, address: SocketAddr, source: std::io::Error) -> StartupError {
    tracing::error!(%address, error = %source, socket, "failed to bind");
    StartupError::Bind {
        socket,
        address,
        source,
    }
}

// A stored permit means a Ctrl-C between ticks is still seen.
fn spawn_ctrl_c(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("ctrl-c received");
                shutdown.notify_one();
            }
            Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
        }
    });
}
