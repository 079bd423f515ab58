//! Ledger store configuration.
//!
//! Read from a small JSON file:
//!
//! ```json
//! {
//!   "CredentialFile": "./authcreds/ggapi-credentials.json",
//!   "SPREADSHEET_ID": "1BltWkU2t8Rk...",
//!   "SPREADSHEET_NAME": "",
//!   "WorksheetName": "Notebook"
//! }
//! ```
//!
//! Every key is optional. The spreadsheet id wins over the name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::{ConfigError, ConnectError};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "go_config.json";

/// Default service-account credential file.
pub const DEFAULT_CREDENTIAL_FILE: &str = "./authcreds/ggapi-credentials.json";

/// Default worksheet holding the ledger.
pub const DEFAULT_WORKSHEET: &str = "Notebook";

/// Where the ledger lives and how to get in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    #[serde(rename = "CredentialFile")]
    pub credential_file: PathBuf,

    #[serde(rename = "SPREADSHEET_ID")]
    pub spreadsheet_id: String,

    #[serde(rename = "SPREADSHEET_NAME")]
    pub spreadsheet_name: String,

    #[serde(rename = "WorksheetName")]
    pub worksheet_name: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            credential_file: PathBuf::from(DEFAULT_CREDENTIAL_FILE),
            spreadsheet_id: String::new(),
            spreadsheet_name: String::new(),
            worksheet_name: DEFAULT_WORKSHEET.to_string(),
        }
    }
}

/// How to find the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetLocator {
    Id(String),
    Name(String),
}

impl LedgerConfig {
    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from a JSON file, falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "using default ledger configuration");
                Self::default()
            }
        }
    }

    /// The spreadsheet to open. Values of one character or less are unset.
    pub fn locator(&self) -> Result<SpreadsheetLocator, ConnectError> {
        if self.spreadsheet_id.trim().chars().count() > 1 {
            Ok(SpreadsheetLocator::Id(self.spreadsheet_id.trim().to_string()))
        } else if self.spreadsheet_name.trim().chars().count() > 1 {
            Ok(SpreadsheetLocator::Name(self.spreadsheet_name.trim().to_string()))
        } else {
            Err(ConnectError::NoSpreadsheet)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_all_keys() {
        let file = file_with(
            r#"{"CredentialFile": "/etc/creds.json", "SPREADSHEET_ID": "abc123",
                "SPREADSHEET_NAME": "帳本", "WorksheetName": "May"}"#,
        );
        let config = LedgerConfig::load(file.path()).unwrap();
        assert_eq!(config.credential_file, PathBuf::from("/etc/creds.json"));
        assert_eq!(config.spreadsheet_id, "abc123");
        assert_eq!(config.worksheet_name, "May");
        assert_eq!(config.locator().unwrap(), SpreadsheetLocator::Id("abc123".into()));
    }

    #[test]
    fn missing_keys_take_defaults() {
        let file = file_with(r#"{"SPREADSHEET_NAME": "帳本"}"#);
        let config = LedgerConfig::load(file.path()).unwrap();
        assert_eq!(config.credential_file, PathBuf::from(DEFAULT_CREDENTIAL_FILE));
        assert_eq!(config.worksheet_name, DEFAULT_WORKSHEET);
        assert_eq!(config.locator().unwrap(), SpreadsheetLocator::Name("帳本".into()));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let file = file_with("{not json");
        let err = LedgerConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(LedgerConfig::load_or_default(file.path()), LedgerConfig::default());
    }

    #[test]
    fn missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(LedgerConfig::load(&path), Err(ConfigError::Read { .. })));
        assert_eq!(LedgerConfig::load_or_default(&path), LedgerConfig::default());
    }

    #[test]
    fn nothing_to_open() {
        let config = LedgerConfig {
            spreadsheet_id: "x".into(),
            ..LedgerConfig::default()
        };
        assert!(matches!(config.locator(), Err(ConnectError::NoSpreadsheet)));
    }
}
