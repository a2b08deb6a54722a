use std::path::Path;

use clap::Parser;
use tracing::info;

use crate::{
    config::{Config, LoggingConfig},
    error::Error,
    file::save_config,
};

#[derive(Parser, Debug, Clone, Default, PartialEq)]
pub struct InitCmd {
    /// Overwrite an existing configuration file
    #[clap(long)]
    pub overwrite: bool,
}

impl InitCmd {
    /// Writes the default configuration, keeping the logging settings chosen on the
    /// command line.
    pub fn run(&self, config_file: &Path, logging: LoggingConfig) -> Result<(), Error> {
        if config_file.exists() && !self.overwrite {
            return Err(Error::AlreadyExists(config_file.to_path_buf()));
        }

        let config = Config { logging, ..Config::default() };
        save_config(config_file, &config)?;
        info!(file = %config_file.display(), "Configuration written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::LogLevel, file::load_config};

    #[test]
    fn refuses_to_overwrite_without_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let logging = LoggingConfig { log_level: LogLevel::Debug, ..Default::default() };

        InitCmd::default().run(&path, logging).expect("first init");
        assert_eq!(load_config(&path).expect("loaded").logging.log_level, LogLevel::Debug);

        assert!(matches!(
            InitCmd::default().run(&path, logging),
            Err(Error::AlreadyExists(_))
        ));
        InitCmd { overwrite: true }.run(&path, LoggingConfig::default()).expect("overwritten");
        assert_eq!(load_config(&path).expect("loaded").logging.log_level, LogLevel::Info);
    }
}
