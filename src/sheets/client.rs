use serde::de::DeserializeOwned;

use super::auth::ServiceAccountAuth;
use super::sheets_err;
use super::types::{ValueRange, ValuesBody};
use crate::config::{SheetsConfig, SheetsCredentials};
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

enum SheetsAuth {
    ServiceAccount(ServiceAccountAuth),
    ApiKey(String),
}

// ============================================================================
// SheetsClient
// ============================================================================

/// HTTP client wrapping the Sheets API v4 `spreadsheets.values` endpoints.
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    auth: SheetsAuth,
}

impl SheetsClient {
    /// Create a client for the configured spreadsheet.
    ///
    /// The underlying `reqwest::Client` is configured with a 30-second timeout.
    pub fn new(config: &SheetsConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        let auth = match &config.credentials {
            SheetsCredentials::ServiceAccount(key) => {
                SheetsAuth::ServiceAccount(ServiceAccountAuth::new(key.clone(), http.clone()))
            }
            SheetsCredentials::ApiKey(key) => SheetsAuth::ApiKey(key.clone()),
        };

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            auth,
        })
    }

    /// Point the client at a different API host (local emulators, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// True when writes can be expected to succeed (API keys are read-only).
    pub fn can_write(&self) -> bool {
        matches!(self.auth, SheetsAuth::ServiceAccount(_))
    }

    pub fn auth_description(&self) -> String {
        match &self.auth {
            SheetsAuth::ServiceAccount(sa) => format!("service account {}", sa.client_email()),
            SheetsAuth::ApiKey(_) => "API key (read-only)".to_string(),
        }
    }

    // --------------------------------------------------------------------
    // Private HTTP helpers
    // --------------------------------------------------------------------

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}{}",
            self.base_url,
            urlencoding::encode(&self.spreadsheet_id),
            urlencoding::encode(range),
            suffix
        )
    }

    /// Build an authenticated request against the given URL.
    async fn authed(&self, method: reqwest::Method, url: String) -> Result<reqwest::RequestBuilder, AppError> {
        let req = self.http.request(method, url);
        match &self.auth {
            SheetsAuth::ServiceAccount(sa) => {
                // Credential failures surface as storage failures to callers.
                let token = sa.access_token().await.map_err(|e| match e {
                    AppError::Auth(msg) => AppError::Storage(msg),
                    other => other,
                })?;
                Ok(req.bearer_auth(token))
            }
            SheetsAuth::ApiKey(key) => Ok(req.query(&[("key", key.as_str())])),
        }
    }

    /// Send a request, check the status code, and deserialize the JSON response.
    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, AppError> {
        let resp = self.send_checked(req).await?;
        resp.json().await.map_err(sheets_err)
    }

    async fn send_checked(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, AppError> {
        let resp = req.send().await.map_err(sheets_err)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Sheets API error ({}): {}",
                status, body
            )));
        }
        Ok(resp)
    }

    // --------------------------------------------------------------------
    // Values
    // --------------------------------------------------------------------

    /// `GET values/{range}` -- all rows in the range, header row included.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, AppError> {
        let req = self.authed(reqwest::Method::GET, self.values_url(range, "")).await?;
        let value_range: ValueRange = self.send_json(req).await?;
        Ok(value_range.into_string_rows())
    }

    /// `PUT values/{range}?valueInputOption=RAW` -- overwrite the range starting at its first cell.
    pub async fn update_values(&self, range: &str, rows: &[Vec<String>]) -> Result<(), AppError> {
        let req = self
            .authed(reqwest::Method::PUT, self.values_url(range, ""))
            .await?
            .query(&[("valueInputOption", "RAW")])
            .json(&ValuesBody { values: rows });
        self.send_checked(req).await?;
        Ok(())
    }

    /// `POST values/{range}:append` -- insert rows after the last row of the table.
    pub async fn append_values(&self, range: &str, rows: &[Vec<String>]) -> Result<(), AppError> {
        let req = self
            .authed(reqwest::Method::POST, self.values_url(range, ":append"))
            .await?
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&ValuesBody { values: rows });
        self.send_checked(req).await?;
        Ok(())
    }
}
