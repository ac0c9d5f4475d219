//! Simulator entry point: CLI wiring, configuration and the server loop.

mod cli;

use std::path::Path;
use std::process;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use device_sim::api::{self, AppState};
use device_sim::config::SimulatorConfig;
use device_sim::error::{Result, SimulatorError};
use device_sim::io::export::export_csv;
use device_sim::journal::Journal;
use device_sim::world::World;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init only happens if something else installed a subscriber first.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Resolves the configuration source and applies CLI overrides.
///
/// `--config` takes priority, then `--preset`, then the baseline preset.
fn load_config(opts: &cli::CliOptions) -> Result<SimulatorConfig> {
    let mut config = if let Some(ref path) = opts.config {
        SimulatorConfig::from_toml_file(path)?
    } else if let Some(ref name) = opts.preset {
        SimulatorConfig::from_preset(name)?
    } else {
        SimulatorConfig::baseline()
    };

    if let Some(ref bind) = opts.bind {
        config.server.bind.clone_from(bind);
    }
    if let Some(ref path) = opts.journal_out {
        config.server.journal_out = Some(path.clone());
    }

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(SimulatorError::Invalid(errors));
    }
    Ok(config)
}

/// Ctrl-C, or SIGTERM on unix.
async fn os_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

fn write_journal(state: &AppState, path: &Path) -> Result<()> {
    export_csv(&state.journal.entries(), path).map_err(|source| SimulatorError::Journal {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), entries = state.journal.len(), "journal written");
    Ok(())
}

async fn run(config: SimulatorConfig) -> Result<()> {
    let addr = config.bind_addr()?;
    let state = Arc::new(
        AppState::new(World::new(&config.state))
            .with_journal(Journal::with_limit(config.server.journal_limit)),
    );

    let listener = api::bind(addr).await?;
    api::serve(Arc::clone(&state), listener, os_signal()).await?;

    if let Some(ref path) = config.server.journal_out {
        write_journal(&state, path)?;
    }
    info!(requests = state.journal.total(), "simulator stopped");
    Ok(())
}

fn main() {
    init_tracing();

    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };
    if opts.help {
        cli::print_usage();
        return;
    }

    let config = match load_config(&opts) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to create tokio runtime");
            process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(config)) {
        error!("{e}");
        process::exit(1);
    }
}
