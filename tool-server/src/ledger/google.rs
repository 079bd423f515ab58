//! Google Sheets ledger store.
//!
//! Talks to the Sheets v4 `values` endpoints directly over HTTP. Opening
//! a spreadsheet by name goes through a Drive file search first.
//!
//! All requests are blocking; sessions are used from the one-call-at-a-time
//! hosts or from `spawn_blocking`.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::auth::{ServiceAccountAuth, ServiceAccountKey, TokenSource};
use super::config::{LedgerConfig, SpreadsheetLocator};
use super::error::{ConnectError, StoreError};
use super::session::{Cell, SessionConnector, SheetSession};
use crate::timetable::BODY_PREVIEW_CHARS;

/// Sheets API spreadsheet collection.
pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Drive API file collection.
pub const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Request timeout in seconds.
const TIMEOUT_SECS: u64 = 20;

/// Column letters for a 1-based column number (`1` is `A`, `27` is `AA`).
pub fn column_letter(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// First row number of an A1 range such as `'Notebook'!A5:E5`.
pub fn row_of_range(range: &str) -> Option<u32> {
    let cells = range.rsplit('!').next()?;
    let first = cells.split(':').next()?;
    first
        .trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '$')
        .parse()
        .ok()
}

/// Worksheet title quoted for use in an A1 range.
fn quoted(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn display_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct SpreadsheetInfo {
    #[serde(default)]
    sheets: Vec<SheetInfo>,
}

#[derive(Debug, Deserialize)]
struct SheetInfo {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendReply {
    updates: AppendUpdates,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Authorized client for the Sheets and Drive APIs.
#[derive(Debug)]
pub struct GoogleSheetsClient<A> {
    http: Client,
    auth: A,
    sheets_url: String,
    drive_url: String,
}

impl<A: TokenSource> GoogleSheetsClient<A> {
    pub fn new(http: Client, auth: A) -> Self {
        Self {
            http,
            auth,
            sheets_url: SHEETS_API_URL.to_string(),
            drive_url: DRIVE_FILES_URL.to_string(),
        }
    }

    /// Set a custom Sheets API base (for testing).
    pub fn with_sheets_url(mut self, url: impl Into<String>) -> Self {
        self.sheets_url = url.into();
        self
    }

    /// Set a custom Drive files URL (for testing).
    pub fn with_drive_url(mut self, url: impl Into<String>) -> Self {
        self.drive_url = url.into();
        self
    }

    fn url(base: &str, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = Url::parse(base).map_err(|e| StoreError::Decode {
            message: format!("invalid API URL {base:?}: {e}"),
        })?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Decode {
                message: format!("API URL {base:?} cannot take a path"),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn sheets(&self, segments: &[&str]) -> Result<Url, StoreError> {
        Self::url(&self.sheets_url, segments)
    }

    /// Send an authorized request and decode the JSON reply.
    fn send<T: DeserializeOwned>(&mut self, request: RequestBuilder) -> Result<T, StoreError> {
        let token = self.auth.access_token()?;
        let response = request.bearer_auth(token).send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body.chars().take(BODY_PREVIEW_CHARS).collect(),
            });
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Decode {
            message: e.to_string(),
        })
    }

    /// Spreadsheet id for a title, via Drive search.
    fn find_by_name(&mut self, name: &str) -> Result<String, ConnectError> {
        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'")
        );
        let request = self
            .http
            .get(Self::url(&self.drive_url, &[])?)
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")]);
        let list: FileList = self.send(request)?;

        list.files
            .into_iter()
            .next()
            .map(|file| file.id)
            .ok_or_else(|| ConnectError::NotFound {
                what: format!("spreadsheet {name:?}"),
            })
    }

    /// Open a worksheet of a spreadsheet.
    pub fn open(
        mut self,
        locator: &SpreadsheetLocator,
        worksheet: &str,
    ) -> Result<GoogleSheet<A>, ConnectError> {
        let spreadsheet_id = match locator {
            SpreadsheetLocator::Id(id) => id.clone(),
            SpreadsheetLocator::Name(name) => self.find_by_name(name)?,
        };

        let request = self
            .http
            .get(self.sheets(&[spreadsheet_id.as_str()])?)
            .query(&[("fields", "properties.title,sheets.properties.title")]);
        let info: SpreadsheetInfo = match self.send(request) {
            Ok(info) => info,
            Err(StoreError::Api { status: 403 | 404, .. }) => {
                return Err(ConnectError::NotFound {
                    what: format!("spreadsheet {spreadsheet_id:?}"),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if !info.sheets.iter().any(|s| s.properties.title == worksheet) {
            return Err(ConnectError::NotFound {
                what: format!("worksheet {worksheet:?}"),
            });
        }

        info!(spreadsheet = %spreadsheet_id, worksheet, "opened ledger sheet");
        Ok(GoogleSheet {
            api: self,
            spreadsheet_id,
            title: worksheet.to_string(),
        })
    }
}

/// One worksheet of a Google spreadsheet.
#[derive(Debug)]
pub struct GoogleSheet<A> {
    api: GoogleSheetsClient<A>,
    spreadsheet_id: String,
    title: String,
}

impl<A: TokenSource> GoogleSheet<A> {
    fn range(&self, cells: &str) -> String {
        format!("{}!{cells}", quoted(&self.title))
    }

    fn values_url(&self, range: &str) -> Result<Url, StoreError> {
        self.api.sheets(&[self.spreadsheet_id.as_str(), "values", range])
    }

    fn write(&mut self, range: &str, values: &[Cell]) -> Result<(), StoreError> {
        let request = self
            .api
            .http
            .put(self.values_url(range)?)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "majorDimension": "ROWS", "values": [values] }));
        let _: Value = self.api.send(request)?;
        Ok(())
    }
}

impl<A: TokenSource> SheetSession for GoogleSheet<A> {
    fn title(&self) -> &str {
        &self.title
    }

    fn append_row(&mut self, values: &[Cell]) -> Result<u32, StoreError> {
        let range = format!("{}:append", self.range("A1"));
        let request = self
            .api
            .http
            .post(self.values_url(&range)?)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "majorDimension": "ROWS", "values": [values] }));
        let reply: AppendReply = self.api.send(request)?;

        debug!(range = %reply.updates.updated_range, "row appended");
        row_of_range(&reply.updates.updated_range).ok_or_else(|| StoreError::Decode {
            message: format!("unexpected updated range {:?}", reply.updates.updated_range),
        })
    }

    fn row_values(&mut self, row: u32) -> Result<Vec<String>, StoreError> {
        let range = self.range(&format!("{row}:{row}"));
        let request = self.api.http.get(self.values_url(&range)?);
        let reply: ValueRange = self.api.send(request)?;

        Ok(reply
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(display_value)
            .collect())
    }

    fn update_row(&mut self, row: u32, values: &[Cell]) -> Result<(), StoreError> {
        let range = self.range(&format!("A{row}"));
        self.write(&range, values)
    }

    fn update_cell(&mut self, row: u32, column: u32, value: Cell) -> Result<(), StoreError> {
        let range = self.range(&format!("{}{row}", column_letter(column)));
        self.write(&range, &[value])
    }
}

/// Opens the configured Google spreadsheet with its service account.
#[derive(Debug, Clone)]
pub struct GoogleConnector {
    config: LedgerConfig,
}

impl GoogleConnector {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }
}

impl SessionConnector for GoogleConnector {
    fn connect(&self) -> Result<Box<dyn SheetSession>, ConnectError> {
        let locator = self.config.locator()?;
        let key = ServiceAccountKey::from_file(&self.config.credential_file)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(StoreError::from)?;

        let auth = ServiceAccountAuth::new(key, http.clone());
        let sheet = GoogleSheetsClient::new(http, auth).open(&locator, &self.config.worksheet_name)?;
        Ok(Box::new(sheet))
    }
}
