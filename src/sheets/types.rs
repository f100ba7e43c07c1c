use serde::{Deserialize, Serialize};

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

// ============================================================================
// Credentials
// ============================================================================

/// The subset of a Google service-account key file needed for the JWT grant.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub client_email: String,
    /// PKCS#8 PEM private key.
    #[serde(default)]
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Response from the OAuth2 token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

// ============================================================================
// Sheets API v4 values payloads
// ============================================================================

/// `ValueRange` as returned by `values.get`. Google omits `values` entirely
/// for an empty range.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    /// Flatten cells to strings. Formatted values arrive as strings already;
    /// anything else is rendered as its JSON text.
    pub fn into_string_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

/// Request body for `values.update` / `values.append`.
#[derive(Debug, Serialize)]
pub(crate) struct ValuesBody<'a> {
    pub values: &'a [Vec<String>],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_range_without_values_is_empty() {
        let vr: ValueRange = serde_json::from_str(r#"{"range":"Sheet1!A1:H1","majorDimension":"ROWS"}"#).unwrap();
        assert!(vr.into_string_rows().is_empty());
    }

    #[test]
    fn test_value_range_stringifies_cells() {
        let vr: ValueRange = serde_json::from_str(r#"{"values":[["Id","Name"],[1,"Ann",null,true]]}"#).unwrap();
        let rows = vr.into_string_rows();
        assert_eq!(rows[1], vec!["1", "Ann", "", "true"]);
    }

    #[test]
    fn test_service_account_debug_redacts_key() {
        let key: ServiceAccountKey =
            serde_json::from_str(r#"{"client_email":"a@b.c","private_key":"SECRET"}"#).unwrap();
        let dbg = format!("{key:?}");
        assert!(!dbg.contains("SECRET"));
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
    }
}
