use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{config::Config, error::Error};

/// Accounts created from the command line, persisted next to the configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountsFile {
    #[serde(default, rename = "accounts")]
    pub entries: Vec<AccountEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub name: String,
    pub private_key: String,
}

/// Load configuration from file
pub fn load_config(config_file: &Path) -> Result<Config, Error> {
    let content =
        fs::read_to_string(config_file).map_err(|_| Error::OpenFile(config_file.to_path_buf()))?;
    toml::from_str(&content)
        .map_err(|e| Error::Parse { path: config_file.to_path_buf(), reason: e.to_string() })
}

/// Save configuration to file
pub fn save_config(config_file: &Path, config: &Config) -> Result<(), Error> {
    save(config_file, &toml::to_string_pretty(config).map_err(|e| Error::ToToml(e.to_string()))?)
}

/// Load persisted accounts. A missing file holds no accounts.
pub fn load_accounts(accounts_file: &Path) -> Result<AccountsFile, Error> {
    if !accounts_file.exists() {
        return Ok(AccountsFile::default());
    }
    let content = fs::read_to_string(accounts_file)
        .map_err(|_| Error::OpenFile(accounts_file.to_path_buf()))?;
    toml::from_str(&content)
        .map_err(|e| Error::Parse { path: accounts_file.to_path_buf(), reason: e.to_string() })
}

/// Save accounts to file
pub fn save_accounts(accounts_file: &Path, accounts: &AccountsFile) -> Result<(), Error> {
    save(
        accounts_file,
        &toml::to_string_pretty(accounts).map_err(|e| Error::ToToml(e.to_string()))?,
    )
}

fn save(path: &Path, data: &str) -> Result<(), Error> {
    use std::io::Write;

    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir).map_err(|_| Error::ParentDir(parent_dir.to_path_buf()))?;
    }

    let mut f = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|_| Error::OpenFile(path.to_path_buf()))?;

    f.write_all(data.as_bytes()).map_err(|_| Error::WriteFile(path.to_path_buf()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_survives_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.scenario.operator_timeout_secs = Some(120);

        save_config(&path, &config).expect("saved");
        assert_eq!(load_config(&path).expect("loaded"), config);
    }

    #[test]
    fn malformed_config_names_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "nodes = 3").expect("written");

        match load_config(&path) {
            Err(Error::Parse { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_accounts_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("accounts.toml");
        assert!(load_accounts(&path).expect("loaded").entries.is_empty());

        let accounts = AccountsFile {
            entries: vec![AccountEntry { name: "alice".into(), private_key: "0x01".into() }],
        };
        save_accounts(&path, &accounts).expect("saved");
        assert_eq!(load_accounts(&path).expect("loaded"), accounts);
    }
}
