mod cli;
mod error_fmt;
mod run;
mod store;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, FILE_GUARD};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporting: {e}");
    }

    // Logging needs the config's [logging] section, so read the config
    // before the subscriber exists; load errors are reported below.
    let cfg = run::load_config(&cli.config);
    let logging = cfg
        .as_ref()
        .map(|c| LoggingInit {
            file: c.logging.file.clone(),
            rotation: c.logging.rotation.clone(),
        })
        .unwrap_or_default();
    init_logging(&cli, &logging);

    let result = cfg.and_then(|cfg| match &cli.cmd {
        Commands::Run { gpio_pin, paused } => run::cmd_run(&cli, &cfg, *gpio_pin, *paused),
        Commands::Simulate { pulses, gap_ms } => {
            run::cmd_simulate(&cli, &cfg, *pulses, *gap_ms)
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            if cli.json {
                eprintln!("{}", error_fmt::json_error(&e));
            } else {
                eprintln!("{}", error_fmt::humanize(&e));
            }
            ExitCode::FAILURE
        }
    }
}

#[derive(Default)]
struct LoggingInit {
    file: Option<String>,
    rotation: Option<String>,
}

/// Console logs go to stderr (stdout is reserved for presenter output);
/// an optional non-blocking file appender adds JSON lines with rotation.
fn init_logging(cli: &Cli, logging: &LoggingInit) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));

    match &logging.file {
        Some(file) => {
            let path = std::path::Path::new(file);
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => std::path::Path::new("."),
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "pour.log".to_string());
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(writer)
                .init();
        }
        None if cli.json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
