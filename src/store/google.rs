//! Google Sheets v4 REST backend.
//!
//! Values are sent with `valueInputOption=RAW`, so canonical date strings stay
//! text and read back unchanged. Reads use `UNFORMATTED_VALUE` so numbers and
//! booleans come back typed.

use crate::config::{SheetCapacity, SyncConfig};
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::reference::{quote_sheet_title, sheet_range};
use crate::store::{SheetStore, StoreError, Worksheet};
use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default endpoint of the Sheets API.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/";

/// Source of bearer tokens for the Sheets API.
///
/// Obtaining and refreshing credentials happens outside this crate; the store
/// asks for a token before every request.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> anyhow::Result<String>;
}

/// A fixed, already-issued access token.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(..)")
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

struct SheetsClient {
    http: Client,
    base_url: Url,
    spreadsheet_id: String,
    tokens: Box<dyn TokenProvider>,
}

impl SheetsClient {
    /// Builds an endpoint URL below `spreadsheets/{id}`; segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidSpreadsheetUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("spreadsheets")
            .push(&self.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    /// Attaches credentials, sends the request and maps non-2xx answers to errors.
    fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let token = self.tokens.token().map_err(StoreError::Authentication)?;
        let response = request.bearer_auth(token).send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .unwrap_or_else(|_| "<unavailable>".to_string());
        Err(StoreError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    fn sheet_titles(&self) -> Result<Vec<String>, StoreError> {
        let url = self.endpoint(&[])?;
        let response = self.send(
            self.http
                .get(url)
                .query(&[("fields", "sheets.properties.title")]),
        )?;
        let metadata: SpreadsheetMetadata = response
            .json()
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(metadata
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }
}

/// Spreadsheet stored in Google Sheets.
#[derive(Clone)]
pub struct GoogleSheetsStore {
    client: Arc<SheetsClient>,
}

impl GoogleSheetsStore {
    /// Opens a spreadsheet by URL or bare key.
    ///
    /// # Arguments
    ///
    /// * `url` - `https://docs.google.com/spreadsheets/d/<key>/...` or the key itself
    /// * `tokens` - Source of bearer tokens
    /// * `timeout` - Timeout applied to every request
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSpreadsheetUrl`] if no key can be found and
    /// [`StoreError::Transport`] if the HTTP client cannot be built.
    pub fn open_by_url(url: &str, tokens: impl TokenProvider + 'static, timeout: Duration) -> Result<Self, StoreError> {
        let spreadsheet_id = extract_spreadsheet_id(url)?;
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = Url::parse(DEFAULT_BASE_URL)
            .map_err(|_| StoreError::InvalidSpreadsheetUrl(DEFAULT_BASE_URL.to_owned()))?;
        Ok(Self {
            client: Arc::new(SheetsClient {
                http,
                base_url,
                spreadsheet_id,
                tokens: Box::new(tokens),
            }),
        })
    }

    /// Opens the spreadsheet named by a [`SyncConfig`].
    pub fn from_config(config: &SyncConfig, tokens: impl TokenProvider + 'static) -> Result<Self, StoreError> {
        Self::open_by_url(
            &config.spreadsheet_url,
            tokens,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    /// Key of the opened spreadsheet.
    pub fn spreadsheet_id(&self) -> &str {
        &self.client.spreadsheet_id
    }
}

impl SheetStore for GoogleSheetsStore {
    type Worksheet = GoogleWorksheet;

    fn worksheet(&self, title: &str) -> Result<GoogleWorksheet, StoreError> {
        if self.client.sheet_titles()?.iter().any(|existing| existing == title) {
            Ok(GoogleWorksheet {
                title: title.to_owned(),
                client: self.client.clone(),
            })
        } else {
            Err(StoreError::NotFound(title.to_owned()))
        }
    }

    fn add_worksheet(&self, title: &str, capacity: SheetCapacity) -> Result<GoogleWorksheet, StoreError> {
        let url = self.client.endpoint(&[])?;
        let url = Url::parse(&format!("{}:batchUpdate", url))
            .map_err(|_| StoreError::InvalidSpreadsheetUrl(url.to_string()))?;
        let body = add_sheet_request(title, capacity);
        debug!("adding worksheet '{}' ({}x{})", title, capacity.rows, capacity.columns);
        self.client.send(self.client.http.post(url).json(&body))?;
        Ok(GoogleWorksheet {
            title: title.to_owned(),
            client: self.client.clone(),
        })
    }
}

/// Handle to one worksheet of a [`GoogleSheetsStore`].
#[derive(Clone)]
pub struct GoogleWorksheet {
    title: String,
    client: Arc<SheetsClient>,
}

impl Worksheet for GoogleWorksheet {
    fn title(&self) -> &str {
        &self.title
    }

    fn read_values(&self) -> Result<Vec<Vec<CellValue>>, StoreError> {
        let url = self.client.endpoint(&["values", &quote_sheet_title(&self.title)])?;
        let response = self.client.send(self.client.http.get(url).query(&READ_QUERY))?;
        let range: ValueRange = response
            .json()
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(range
            .values
            .iter()
            .map(|row| row.iter().map(from_json).collect())
            .collect())
    }

    fn append_row(&self, values: &[CellValue]) -> Result<(), StoreError> {
        let (range, body) = append_request(&self.title, values);
        let url = self.client.endpoint(&["values", &range])?;
        self.client.send(self.client.http.post(url).query(&APPEND_QUERY).json(&body))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let range = format!("{}:clear", quote_sheet_title(&self.title));
        let url = self.client.endpoint(&["values", &range])?;
        self.client.send(self.client.http.post(url).json(&json!({})))?;
        Ok(())
    }

    fn write_rows(&self, rows: &[Vec<CellValue>]) -> Result<(), StoreError> {
        let (range, body) = write_request(&self.title, rows);
        let url = self.client.endpoint(&["values", &range])?;
        self.client.send(self.client.http.put(url).query(&WRITE_QUERY).json(&body))?;
        Ok(())
    }
}

const READ_QUERY: [(&str, &str); 2] = [("majorDimension", "ROWS"), ("valueRenderOption", "UNFORMATTED_VALUE")];
const APPEND_QUERY: [(&str, &str); 2] = [("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")];
const WRITE_QUERY: [(&str, &str); 1] = [("valueInputOption", "RAW")];

/// Body of the `batchUpdate` call creating a worksheet of the given size.
fn add_sheet_request(title: &str, capacity: SheetCapacity) -> Value {
    json!({
        "requests": [{
            "addSheet": {
                "properties": {
                    "title": title,
                    "gridProperties": {
                        "rowCount": capacity.rows,
                        "columnCount": capacity.columns,
                    }
                }
            }
        }]
    })
}

/// Range and body appending one row after the last row of a sheet.
fn append_request(title: &str, values: &[CellValue]) -> (String, Value) {
    let range = format!("{}!A1:append", quote_sheet_title(title));
    let body = json!({
        "majorDimension": "ROWS",
        "values": [values.iter().map(to_json).collect::<Vec<_>>()],
    });
    (range, body)
}

/// Range and body overwriting a sheet from A1 with the given rows.
fn write_request(title: &str, rows: &[Vec<CellValue>]) -> (String, Value) {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let range = sheet_range(title, rows.len(), width);
    let body = json!({
        "range": range,
        "majorDimension": "ROWS",
        "values": rows
            .iter()
            .map(|row| row.iter().map(to_json).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    });
    (range, body)
}

/// Extracts the spreadsheet key from a Sheets URL, or accepts a bare key.
pub(crate) fn extract_spreadsheet_id(value: &str) -> Result<String, StoreError> {
    let key = Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Hardcode regex pattern");
    if let Ok(url) = Url::parse(value) {
        let segments: Vec<&str> = url.path_segments().map(|segments| segments.collect()).unwrap_or_default();
        return segments
            .windows(3)
            .find(|window| window[0] == "spreadsheets" && window[1] == "d" && key.is_match(window[2]))
            .map(|window| window[2].to_owned())
            .ok_or_else(|| StoreError::InvalidSpreadsheetUrl(value.to_owned()));
    }
    if key.is_match(value) {
        Ok(value.to_owned())
    } else {
        Err(StoreError::InvalidSpreadsheetUrl(value.to_owned()))
    }
}

/// Converts a cell to the JSON sent with `RAW` input; dates are always text.
fn to_json(value: &CellValue) -> Value {
    match value {
        CellValue::Empty => Value::String(String::new()),
        CellValue::Boolean(value) => Value::Bool(*value),
        CellValue::Integer(value) => Value::from(*value),
        CellValue::Number(value) => serde_json::Number::from_f64(*value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string())),
        CellValue::Text(value) => Value::String(value.to_owned()),
        CellValue::Date(_) | CellValue::DateTime(_) => Value::String(value.to_cell_string()),
    }
}

/// Converts an unformatted JSON cell back into a value.
fn from_json(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Bool(value) => CellValue::Boolean(*value),
        Value::Number(number) => number
            .as_i64()
            .map(CellValue::Integer)
            .or_else(|| number.as_f64().map(CellValue::Number))
            .unwrap_or_else(|| CellValue::Text(number.to_string())),
        Value::String(text) if text.is_empty() => CellValue::Empty,
        Value::String(text) => CellValue::Text(text.to_owned()),
        other => CellValue::Text(other.to_string()),
    }
}
