#![allow(missing_docs)]
//! Fault-tolerance experiment harness

use std::path::Path;

use color_eyre::eyre::{Result, eyre};
use faultline_cli::{
    app::App,
    args::{Args, Commands},
    cmd::init::InitCmd,
    config::{self, Config, LoggingConfig},
    logging, runtime,
};
use tracing::{info, trace};

/// Main entry point for the application
///
/// This function:
/// - Parses command-line arguments
/// - Loads configuration from file
/// - Initializes logging system
/// - Sets up error handling
/// - Connects to the configured nodes and runs the selected command
fn main() -> Result<()> {
    color_eyre::install()?;

    // Also forward panics to tracing so they show up alongside experiment logs.
    // This supplements color-eyre's pretty panic output on stderr.
    install_tracing_panic_hook();

    // Load command-line arguments and possible configuration file.
    let args = Args::new();

    let config_file = args
        .get_config_file_path()
        .map_err(|error| eyre!("Failed to get configuration file path: {error}"))?;

    // `init` runs before a configuration exists.
    if let Commands::Init(cmd) = &args.command {
        let logging = logging_overrides(&args, LoggingConfig::default());
        let _guard = logging::init(logging.log_level, logging.log_format);
        return init(cmd, &config_file, logging);
    }

    let mut config = load_or_default(&config_file)?;
    config.logging = logging_overrides(&args, config.logging);

    // This is a drop guard responsible for flushing any remaining logs when the program terminates.
    // It must be assigned to a binding that is not _, as _ will result in the guard being dropped
    // immediately.
    let _guard = logging::init(config.logging.log_level, config.logging.log_format);

    trace!("Command-line parameters: {args:?}");

    config.apply_env_overrides();
    trace!(?config, "Configuration");

    let rt = runtime::build_runtime(config.runtime)?;
    let accounts_file = args.get_accounts_file_path()?;

    rt.block_on(async move {
        let app = App::connect(config, &accounts_file)?;

        let result = match &args.command {
            Commands::Init(_) => Ok(()),
            Commands::Menu(cmd) => cmd.run(&app).await,
            Commands::Status(cmd) => cmd.run(&app).await,
            Commands::Verify(cmd) => cmd.run(&app).await,
            Commands::Scenario(cmd) => cmd.run(&app).await,
            Commands::RunAll(cmd) => cmd.run(&app).await,
            Commands::Accounts(cmd) => cmd.run(&app, &accounts_file).await,
            Commands::Balance(cmd) => cmd.run(&app).await,
            Commands::Send(cmd) => cmd.run(&app).await,
        };

        app.shutdown().await;
        result
    })
}

/// Override logging configuration with optional command-line parameters.
fn logging_overrides(args: &Args, mut logging: LoggingConfig) -> LoggingConfig {
    if let Some(log_level) = args.log_level {
        logging.log_level = log_level;
    }
    if let Some(log_format) = args.log_format {
        logging.log_format = log_format;
    }
    logging
}

/// Falls back to the reference topology when no configuration file was written yet.
fn load_or_default(config_file: &Path) -> Result<Config> {
    if !config_file.exists() {
        return Ok(Config::default());
    }
    config::load_config(config_file)
        .map_err(|error| eyre!("Failed to load configuration file: {error}"))
}

fn init(cmd: &InitCmd, config_file: &Path, logging: LoggingConfig) -> Result<()> {
    cmd.run(config_file, logging).map_err(|error| eyre!("Failed to run init command: {error}"))?;
    info!("Run `faultline menu` to start the experiment");
    Ok(())
}

fn install_tracing_panic_hook() {
    use std::panic;

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let msg: &str = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.as_str()
        } else {
            "panic"
        };

        let bt = std::backtrace::Backtrace::force_capture();
        tracing::error!(
            target = "panic",
            %location,
            message = %msg,
            backtrace = %format!("{bt}"),
            "panic occurred"
        );

        default_hook(info);
    }));
}
