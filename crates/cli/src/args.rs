//! Command-line interface arguments for the faultline harness.
//!
//! Global flags select the home directory, configuration file and logging; every
//! operation of the harness maps to one subcommand.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    cmd::{
        accounts::AccountsCmd, balance::BalanceCmd, init::InitCmd, menu::MenuCmd,
        run_all::RunAllCmd, scenario::ScenarioCmd, send::SendCmd, status::StatusCmd,
        verify::VerifyCmd,
    },
    config::{LogFormat, LogLevel},
    error::Error,
};

const APP_FOLDER: &str = ".faultline";
const CONFIG_FILE: &str = "config.toml";
const ACCOUNTS_FILE: &str = "accounts.toml";

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Home directory (default: `~/.faultline`)
    #[arg(long, global = true, value_name = "HOME_DIR", env = "FAULTLINE_HOME")]
    pub home: Option<PathBuf>,

    /// Configuration file (default: `<home>/config.toml`)
    #[arg(long, global = true, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Log level (default: from the configuration file, else `info`)
    #[arg(long, global = true, env = "FAULTLINE_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Log format (default: from the configuration file, else `plaintext`)
    #[arg(long, global = true, env = "FAULTLINE_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Write a default configuration describing the reference three-node topology
    Init(InitCmd),

    /// Interactive experiment menu
    Menu(MenuCmd),

    /// Liveness, height and peer count of every node
    Status(StatusCmd),

    /// Compare block hashes across the online nodes
    Verify(VerifyCmd),

    /// Run one experiment scenario (1-4)
    Scenario(ScenarioCmd),

    /// Run scenarios 1 to 4 back to back
    RunAll(RunAllCmd),

    /// Manage signing accounts
    Accounts(AccountsCmd),

    /// Balance of an address on one or every node
    Balance(BalanceCmd),

    /// Submit a value transfer
    Send(SendCmd),
}

impl Args {
    pub fn new() -> Args {
        Args::parse()
    }

    /// Home directory. Either from `--home`/`FAULTLINE_HOME` or `~/.faultline`.
    pub fn get_home_dir(&self) -> Result<PathBuf, Error> {
        match &self.home {
            Some(home) => Ok(home.clone()),
            None => Ok(dirs::home_dir().ok_or(Error::DirPath)?.join(APP_FOLDER)),
        }
    }

    pub fn get_config_file_path(&self) -> Result<PathBuf, Error> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Ok(self.get_home_dir()?.join(CONFIG_FILE)),
        }
    }

    pub fn get_accounts_file_path(&self) -> Result<PathBuf, Error> {
        Ok(self.get_home_dir()?.join(ACCOUNTS_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_defaults_under_home() {
        let args = Args::parse_from(["faultline", "--home", "/tmp/fl", "status"]);
        assert_eq!(
            args.get_config_file_path().expect("path"),
            PathBuf::from("/tmp/fl/config.toml")
        );
        assert_eq!(
            args.get_accounts_file_path().expect("path"),
            PathBuf::from("/tmp/fl/accounts.toml")
        );
    }

    #[test]
    fn explicit_config_wins() {
        let args =
            Args::parse_from([
                "faultline",
                "--home",
                "/tmp/fl",
                "--config",
                "/etc/fl.toml",
                "status",
            ]);
        assert_eq!(args.get_config_file_path().expect("path"), PathBuf::from("/etc/fl.toml"));
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let args = Args::parse_from(["faultline", "scenario", "3", "--log-level", "debug"]);
        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert!(matches!(args.command, Commands::Scenario(ScenarioCmd { number: 3, .. })));
    }

    #[test]
    fn scenario_number_is_bounded() {
        assert!(Args::try_parse_from(["faultline", "scenario", "5"]).is_err());
    }
}
