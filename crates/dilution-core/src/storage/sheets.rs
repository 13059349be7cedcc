//! Google Sheets ledger.
//!
//! Rows are appended with the Sheets v4 `values:append` endpoint. A
//! spreadsheet can be named by URL or by title; titles are looked up with
//! the Drive v3 file search. The caller supplies an OAuth bearer token, read
//! from a file or an environment variable.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use url::Url;

use super::row::SnapshotRow;
use super::sink::RowSink;
use crate::error::{DilutionError, Result};

pub const DEFAULT_WORKSHEET: &str = "Sheet1";
pub const DEFAULT_TOKEN_ENV: &str = "DILUTION_SHEETS_TOKEN";
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const DRIVE_API_BASE: &str = "https://www.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// `[sheet]` section of the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetsConfig {
    /// Spreadsheet URL or title. Nothing is written when unset.
    pub target: Option<String>,
    pub worksheet: String,
    /// File holding the bearer token. Takes precedence over `token_env`.
    pub token_file: Option<PathBuf>,
    pub token_env: String,
    pub sheets_api_base: String,
    pub drive_api_base: String,
    pub timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        SheetsConfig {
            target: None,
            worksheet: DEFAULT_WORKSHEET.to_string(),
            token_file: None,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            sheets_api_base: SHEETS_API_BASE.to_string(),
            drive_api_base: DRIVE_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SheetsConfig {
    /// Read the bearer token from `token_file`, or from `token_env` when no
    /// file is configured.
    pub fn resolve_token(&self) -> Result<String> {
        let token = match &self.token_file {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                DilutionError::resource_access(
                    "Google Sheets",
                    format!("cannot read token file {}: {}", path.display(), e),
                )
            })?,
            None => std::env::var(&self.token_env).map_err(|_| {
                DilutionError::resource_access(
                    "Google Sheets",
                    format!(
                        "no access token: set ${} or sheet.token_file",
                        self.token_env
                    ),
                )
            })?,
        };
        let token = token.trim();
        if token.is_empty() {
            return Err(DilutionError::resource_access(
                "Google Sheets",
                "access token is empty",
            ));
        }
        Ok(token.to_string())
    }
}

/// How the user named the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetReference {
    /// Spreadsheet id taken from a `docs.google.com` URL.
    Key(String),
    /// Spreadsheet title, resolved through Drive.
    Title(String),
}

fn spreadsheet_url_re() -> &'static Regex {
    static SHEET_URL_RE: OnceLock<Regex> = OnceLock::new();
    SHEET_URL_RE.get_or_init(|| {
        Regex::new(r"/d/([A-Za-z0-9_-]+)").expect("spreadsheet url regex must compile")
    })
}

impl SheetReference {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DilutionError::resource_access(
                "Google Sheets",
                "no spreadsheet name or URL given",
            ));
        }
        if input.contains("docs.google.com") {
            return spreadsheet_url_re()
                .captures(input)
                .map(|caps| SheetReference::Key(caps[1].to_string()))
                .ok_or_else(|| {
                    DilutionError::resource_access(input, "URL does not contain a spreadsheet id")
                });
        }
        Ok(SheetReference::Title(input.to_string()))
    }
}

impl std::fmt::Display for SheetReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetReference::Key(id) => write!(f, "spreadsheet {}", id),
            SheetReference::Title(title) => write!(f, "spreadsheet '{}'", title),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Appends snapshot rows to a worksheet of a Google spreadsheet.
pub struct SheetsSink {
    client: Client,
    reference: SheetReference,
    worksheet: String,
    token: String,
    sheets_api_base: Url,
    drive_api_base: Url,
    /// Spreadsheet id once the reference and worksheet have been checked.
    resolved: Option<String>,
}

impl SheetsSink {
    /// Build a sink from config. Fails when no target is configured or no
    /// token is available.
    pub fn from_config(config: &SheetsConfig) -> Result<Self> {
        let target = config.target.as_deref().ok_or_else(|| {
            DilutionError::Config("sheet.target is not set".to_string())
        })?;
        let token = config.resolve_token()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| DilutionError::resource_access("Google Sheets", e))?;
        Self::with_client(client, config, SheetReference::parse(target)?, token)
    }

    pub(crate) fn with_client(
        client: Client,
        config: &SheetsConfig,
        reference: SheetReference,
        token: String,
    ) -> Result<Self> {
        let parse_base = |base: &str| {
            Url::parse(base)
                .map_err(|e| DilutionError::Config(format!("invalid API base '{}': {}", base, e)))
        };
        let worksheet = if config.worksheet.trim().is_empty() {
            DEFAULT_WORKSHEET.to_string()
        } else {
            config.worksheet.trim().to_string()
        };
        Ok(SheetsSink {
            client,
            reference,
            worksheet,
            token,
            sheets_api_base: parse_base(&config.sheets_api_base)?,
            drive_api_base: parse_base(&config.drive_api_base)?,
            resolved: None,
        })
    }

    pub fn reference(&self) -> &SheetReference {
        &self.reference
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    fn endpoint(base: &Url, segments: &[&str]) -> Url {
        let mut url = base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Map an HTTP status from a lookup request to a resource access error.
    fn check_access(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let reason = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                "access denied; check the token and that the sheet is shared".to_string()
            }
            StatusCode::NOT_FOUND => "not found".to_string(),
            _ => format!("unexpected status {}", status),
        };
        Err(DilutionError::resource_access(self.reference.to_string(), reason))
    }

    fn find_by_title(&self, title: &str) -> Result<String> {
        let mut url = Self::endpoint(&self.drive_api_base, &["drive", "v3", "files"]);
        let escaped = title.replace('\\', "\\\\").replace('\'', "\\'");
        url.query_pairs_mut()
            .append_pair(
                "q",
                &format!(
                    "name = '{}' and mimeType = '{}' and trashed = false",
                    escaped, SPREADSHEET_MIME_TYPE
                ),
            )
            .append_pair("fields", "files(id,name)")
            .append_pair("pageSize", "10");

        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| DilutionError::resource_access(self.reference.to_string(), e))?;
        let list: DriveFileList = self
            .check_access(response)?
            .json()
            .map_err(|e| DilutionError::resource_access(self.reference.to_string(), e))?;

        list.files
            .into_iter()
            .next()
            .map(|file| file.id)
            .ok_or_else(|| DilutionError::resource_access(self.reference.to_string(), "not found"))
    }

    fn check_worksheet(&self, spreadsheet_id: &str) -> Result<()> {
        let mut url = Self::endpoint(&self.sheets_api_base, &["v4", "spreadsheets", spreadsheet_id]);
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| DilutionError::resource_access(self.reference.to_string(), e))?;
        let meta: SpreadsheetMeta = self
            .check_access(response)?
            .json()
            .map_err(|e| DilutionError::resource_access(self.reference.to_string(), e))?;

        if meta
            .sheets
            .iter()
            .any(|sheet| sheet.properties.title == self.worksheet)
        {
            Ok(())
        } else {
            Err(DilutionError::resource_access(
                self.reference.to_string(),
                format!("worksheet '{}' not found", self.worksheet),
            ))
        }
    }

    /// Resolve the spreadsheet id and confirm the worksheet exists.
    /// The outcome is cached after the first success.
    pub fn connect(&mut self) -> Result<String> {
        if let Some(id) = &self.resolved {
            return Ok(id.clone());
        }
        let id = match &self.reference {
            SheetReference::Key(id) => id.clone(),
            SheetReference::Title(title) => self.find_by_title(title)?,
        };
        self.check_worksheet(&id)?;
        log::info!("Connected to {} (worksheet '{}')", self.reference, self.worksheet);
        self.resolved = Some(id.clone());
        Ok(id)
    }

    /// A1 range naming the whole worksheet, with quotes escaped.
    fn append_range(&self) -> String {
        format!("'{}'!A1:append", self.worksheet.replace('\'', "''"))
    }
}

impl RowSink for SheetsSink {
    fn name(&self) -> String {
        format!("{} / {}", self.reference, self.worksheet)
    }

    fn append_row(&mut self, row: &SnapshotRow) -> Result<()> {
        let spreadsheet_id = self.connect()?;
        let range = self.append_range();
        let mut url = Self::endpoint(
            &self.sheets_api_base,
            &["v4", "spreadsheets", &spreadsheet_id, "values", &range],
        );
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let body = serde_json::json!({
            "majorDimension": "ROWS",
            "values": [row.to_json()],
        });

        log::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(|e| DilutionError::persistence(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            let detail = detail.trim();
            let message = if detail.is_empty() {
                format!("status {}", status)
            } else {
                format!("status {}: {}", status, detail)
            };
            return Err(DilutionError::persistence(self.name(), message));
        }
        log::info!("Appended snapshot row to {}", self.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FormInput;
    use dilution_engine::engine::calculate;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// A request as seen by the test responder.
    struct Recorded {
        head: String,
        body: String,
    }

    /// Serve one scripted response per connection, in order, then stop.
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<Recorded>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let mut recorded = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                recorded.push(read_request(&mut stream));
                let reply = format!(
                    "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                stream.write_all(reply.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
            recorded
        });
        (base, handle)
    }

    fn read_request(stream: &mut std::net::TcpStream) -> Recorded {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let head_end = loop {
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "connection closed before request head");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < head_end + content_length {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let body = String::from_utf8_lossy(&buf[head_end..]).to_string();
        Recorded { head, body }
    }

    fn sink_for(base: &str, reference: SheetReference, worksheet: &str) -> SheetsSink {
        let config = SheetsConfig {
            worksheet: worksheet.to_string(),
            sheets_api_base: base.to_string(),
            drive_api_base: base.to_string(),
            ..SheetsConfig::default()
        };
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        SheetsSink::with_client(client, &config, reference, "test-token".to_string()).unwrap()
    }

    fn sample_row() -> SnapshotRow {
        let form = FormInput::default();
        let result = calculate(&form.round_one(), Some(&form.round_two())).unwrap();
        SnapshotRow::new(&form, &result)
    }

    const META_SHEET1: &str = r#"{"sheets":[{"properties":{"title":"Sheet1"}},{"properties":{"title":"Archive"}}]}"#;
    const APPEND_OK: &str = r#"{"updates":{"updatedRows":1}}"#;

    #[test]
    fn test_parse_reference_from_url() {
        let reference = SheetReference::parse(
            "https://docs.google.com/spreadsheets/d/1AbC-xyz_9/edit#gid=0",
        )
        .unwrap();
        assert_eq!(reference, SheetReference::Key("1AbC-xyz_9".to_string()));
    }

    #[test]
    fn test_parse_reference_title() {
        assert_eq!(
            SheetReference::parse("  Fund II deals ").unwrap(),
            SheetReference::Title("Fund II deals".to_string())
        );
    }

    #[test]
    fn test_parse_reference_rejects_empty_and_idless_url() {
        assert!(matches!(
            SheetReference::parse("   "),
            Err(DilutionError::ResourceAccessFailure { .. })
        ));
        assert!(matches!(
            SheetReference::parse("https://docs.google.com/spreadsheets/u/0/"),
            Err(DilutionError::ResourceAccessFailure { .. })
        ));
    }

    #[test]
    fn test_resolve_token_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "abc123\n").unwrap();
        let config = SheetsConfig {
            token_file: Some(path),
            ..SheetsConfig::default()
        };
        assert_eq!(config.resolve_token().unwrap(), "abc123");
    }

    #[test]
    fn test_resolve_token_missing() {
        let config = SheetsConfig {
            token_env: "DILUTION_TEST_TOKEN_THAT_IS_NEVER_SET".to_string(),
            ..SheetsConfig::default()
        };
        let err = config.resolve_token().unwrap_err();
        assert!(matches!(err, DilutionError::ResourceAccessFailure { .. }));
        assert!(err.to_string().contains("DILUTION_TEST_TOKEN_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_from_config_requires_target() {
        let err = SheetsSink::from_config(&SheetsConfig::default()).err().unwrap();
        assert!(matches!(err, DilutionError::Config(_)));
    }

    #[test]
    fn test_append_row_by_key() {
        let (base, server) = serve(vec![(200, META_SHEET1), (200, APPEND_OK), (200, APPEND_OK)]);
        let mut sink = sink_for(&base, SheetReference::Key("abc123".to_string()), "Sheet1");

        sink.append_row(&sample_row()).unwrap();
        sink.append_row(&sample_row()).unwrap();

        let requests = server.join().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].head.starts_with("GET /v4/spreadsheets/abc123?fields="));
        assert!(requests[0].head.to_ascii_lowercase().contains("authorization: bearer test-token"));

        for append in &requests[1..] {
            let request_line = append.head.lines().next().unwrap();
            assert!(request_line.starts_with("POST /v4/spreadsheets/abc123/values/"));
            assert!(request_line.contains(":append?valueInputOption=RAW"));
            let body: serde_json::Value = serde_json::from_str(&append.body).unwrap();
            let values = body["values"][0].as_array().unwrap();
            assert_eq!(values.len(), 10);
            assert_eq!(values[0], serde_json::json!(2_000_000.0));
        }
    }

    #[test]
    fn test_append_row_by_title_uses_drive_lookup() {
        let (base, server) = serve(vec![
            (200, r#"{"files":[{"id":"found-id","name":"Deals"}]}"#),
            (200, META_SHEET1),
            (200, APPEND_OK),
        ]);
        let mut sink = sink_for(&base, SheetReference::Title("Deals".to_string()), "Archive");

        sink.append_row(&sample_row()).unwrap();

        let requests = server.join().unwrap();
        assert!(requests[0].head.starts_with("GET /drive/v3/files?q="));
        assert!(requests[1].head.starts_with("GET /v4/spreadsheets/found-id?"));
        assert!(requests[2].head.starts_with("POST /v4/spreadsheets/found-id/values/"));
    }

    #[test]
    fn test_quotes_are_escaped_in_lookup_and_range() {
        let (base, server) = serve(vec![
            (200, r#"{"files":[{"id":"quoted-id","name":"Bob's deals"}]}"#),
            (200, r#"{"sheets":[{"properties":{"title":"O'Neil"}}]}"#),
            (200, APPEND_OK),
        ]);
        let mut sink = sink_for(
            &base,
            SheetReference::Title(r"Bob's \ deals".to_string()),
            "O'Neil",
        );

        sink.append_row(&sample_row()).unwrap();

        let requests = server.join().unwrap();
        let target = requests[0].head.split_whitespace().nth(1).unwrap();
        let lookup = Url::parse(&format!("http://localhost{target}")).unwrap();
        let q = lookup
            .query_pairs()
            .find(|(name, _)| name == "q")
            .map(|(_, value)| value.into_owned())
            .unwrap();
        assert_eq!(
            q,
            r"name = 'Bob\'s \\ deals' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false"
        );
        assert!(
            requests[2]
                .head
                .starts_with("POST /v4/spreadsheets/quoted-id/values/'O''Neil'!A1:append?"),
            "{}",
            requests[2].head
        );
    }

    #[test]
    fn test_unknown_title_is_resource_access_failure() {
        let (base, server) = serve(vec![(200, r#"{"files":[]}"#)]);
        let mut sink = sink_for(&base, SheetReference::Title("Missing".to_string()), "Sheet1");

        let err = sink.append_row(&sample_row()).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, DilutionError::ResourceAccessFailure { .. }));
    }

    #[test]
    fn test_missing_worksheet_is_resource_access_failure() {
        let (base, server) = serve(vec![(200, META_SHEET1)]);
        let mut sink = sink_for(&base, SheetReference::Key("abc123".to_string()), "Q3");

        let err = sink.append_row(&sample_row()).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, DilutionError::ResourceAccessFailure { .. }));
        assert!(err.to_string().contains("worksheet 'Q3' not found"));
    }

    #[test]
    fn test_forbidden_is_resource_access_failure() {
        let (base, server) = serve(vec![(403, r#"{"error":{"code":403}}"#)]);
        let mut sink = sink_for(&base, SheetReference::Key("abc123".to_string()), "Sheet1");

        let err = sink.append_row(&sample_row()).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, DilutionError::ResourceAccessFailure { .. }));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_failed_append_is_persistence_failure() {
        let (base, server) = serve(vec![(200, META_SHEET1), (500, r#"{"error":"backend"}"#)]);
        let mut sink = sink_for(&base, SheetReference::Key("abc123".to_string()), "Sheet1");

        let err = sink.append_row(&sample_row()).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, DilutionError::PersistenceFailure { .. }));
        assert!(err.to_string().contains("500"));
    }
}
