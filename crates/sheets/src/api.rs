//! REST client for the Google Sheets v4 API.
//!
//! Wraps the handful of endpoints the service needs (spreadsheet metadata,
//! `batchUpdate` for worksheet management, and the `values` collection)
//! using [`reqwest`], authenticating every call with a service-account
//! bearer token.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::a1;
use crate::auth::TokenProvider;
use crate::backend::{SheetsBackend, SpreadsheetMeta, WorksheetMeta};
use crate::credentials::ServiceAccountKey;
use crate::error::{classify, SheetsError};

/// Production endpoint of the spreadsheets collection.
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

const METADATA_FIELDS: &str = "spreadsheetId,properties.title,sheets.properties(sheetId,title,index)";

/// HTTP client for one service account.
pub struct GoogleSheetsApi {
    http: reqwest::Client,
    tokens: TokenProvider,
    base_url: String,
}

// ---- response shapes ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetResource {
    #[serde(default)]
    spreadsheet_id: String,
    properties: SpreadsheetProperties,
    #[serde(default)]
    sheets: Vec<SheetResource>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetResource {
    properties: SheetProperties,
}

// Zero-valued fields are omitted from API responses, hence the defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    index: u32,
}

impl From<SheetProperties> for WorksheetMeta {
    fn from(p: SheetProperties) -> Self {
        Self {
            sheet_id: p.sheet_id,
            title: p.title,
            index: p.index,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<BatchReply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchReply {
    add_sheet: Option<SheetResource>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl GoogleSheetsApi {
    /// Create a client against the production API.
    pub fn new(http: reqwest::Client, key: ServiceAccountKey) -> Self {
        Self::with_base_url(http, key, SHEETS_API_BASE.to_string())
    }

    /// Create a client against another endpoint (used by tests).
    pub fn with_base_url(http: reqwest::Client, key: ServiceAccountKey, base_url: String) -> Self {
        Self {
            tokens: TokenProvider::new(http.clone(), key),
            http,
            base_url,
        }
    }

    // ---- private helpers ----

    /// Build `{base}/{segments...}`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| SheetsError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| SheetsError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, SheetsError> {
        self.url(&[spreadsheet_id, "values", range])
    }

    /// Attach a bearer token, send, and parse a successful JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SheetsError> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(classify(status.as_u16(), &body));
        }
        Ok(response.json::<T>().await?)
    }

    async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Value,
    ) -> Result<BatchUpdateResponse, SheetsError> {
        let target = format!("{spreadsheet_id}:batchUpdate");
        let url = self.url(&[target.as_str()])?;
        self.send(self.http.post(url).json(&json!({ "requests": requests })))
            .await
    }
}

#[async_trait]
impl SheetsBackend for GoogleSheetsApi {
    fn service_account_email(&self) -> &str {
        &self.tokens.key().client_email
    }

    fn project_id(&self) -> Option<&str> {
        self.tokens.key().project_id.as_deref()
    }

    async fn open_by_key(&self, spreadsheet_id: &str) -> Result<SpreadsheetMeta, SheetsError> {
        let url = self.url(&[spreadsheet_id])?;
        let resource: SpreadsheetResource = self
            .send(self.http.get(url).query(&[("fields", METADATA_FIELDS)]))
            .await?;

        Ok(SpreadsheetMeta {
            spreadsheet_id: if resource.spreadsheet_id.is_empty() {
                spreadsheet_id.to_string()
            } else {
                resource.spreadsheet_id
            },
            title: resource.properties.title,
            worksheets: resource
                .sheets
                .into_iter()
                .map(|s| s.properties.into())
                .collect(),
        })
    }

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<WorksheetMeta, SheetsError> {
        let response = self
            .batch_update(
                spreadsheet_id,
                json!([{
                    "addSheet": {
                        "properties": {
                            "title": title,
                            "gridProperties": { "rowCount": rows, "columnCount": cols },
                        }
                    }
                }]),
            )
            .await?;

        response
            .replies
            .into_iter()
            .find_map(|r| r.add_sheet)
            .map(|s| s.properties.into())
            .ok_or_else(|| SheetsError::Api {
                status: 200,
                message: "addSheet reply missing from batchUpdate response".to_string(),
            })
    }

    async fn rename_worksheet(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        title: &str,
    ) -> Result<(), SheetsError> {
        self.batch_update(
            spreadsheet_id,
            json!([{
                "updateSheetProperties": {
                    "properties": { "sheetId": sheet_id, "title": title },
                    "fields": "title",
                }
            }]),
        )
        .await?;
        Ok(())
    }

    async fn row_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        row: u32,
    ) -> Result<Vec<String>, SheetsError> {
        let url = self.values_url(spreadsheet_id, &a1::whole_row(worksheet, row))?;
        let range: ValueRange = self
            .send(self.http.get(url).query(&[("majorDimension", "ROWS")]))
            .await?;

        Ok(range
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(cell_text)
            .collect())
    }

    async fn update_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        row: u32,
        values: &[String],
    ) -> Result<(), SheetsError> {
        let range = a1::row_span(worksheet, row, values.len());
        let url = self.values_url(spreadsheet_id, &range)?;
        let body = json!({ "range": range, "majorDimension": "ROWS", "values": [values] });

        let _: IgnoredAny = self
            .send(
                self.http
                    .put(url)
                    .query(&[("valueInputOption", "RAW")])
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        values: &[String],
    ) -> Result<(), SheetsError> {
        let target = format!("{}:append", a1::quote_title(worksheet));
        let url = self.values_url(spreadsheet_id, &target)?;
        let body = json!({ "majorDimension": "ROWS", "values": [values] });

        let _: IgnoredAny = self
            .send(
                self.http
                    .post(url)
                    .query(&[
                        ("valueInputOption", "USER_ENTERED"),
                        ("insertDataOption", "INSERT_ROWS"),
                    ])
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn row_count(&self, spreadsheet_id: &str, worksheet: &str) -> Result<usize, SheetsError> {
        let url = self.values_url(spreadsheet_id, &a1::quote_title(worksheet))?;
        let range: ValueRange = self.send(self.http.get(url)).await?;
        Ok(range.values.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str) -> GoogleSheetsApi {
        let key = ServiceAccountKey {
            client_email: "svc@proj.iam.gserviceaccount.com".into(),
            private_key: "unused".into(),
            private_key_id: None,
            project_id: Some("proj".into()),
            token_uri: "http://127.0.0.1:1/token".into(),
        };
        GoogleSheetsApi::with_base_url(reqwest::Client::new(), key, base_url.to_string())
    }

    #[test]
    fn segments_are_percent_encoded() {
        let api = api(SHEETS_API_BASE);
        let url = api.values_url("abc", "'My Bookings'!1:1").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'My%20Bookings'!1:1"
        );
    }

    #[test]
    fn trailing_slash_in_base_is_tolerated() {
        let api = api("http://localhost:9000/v4/spreadsheets/");
        let url = api.url(&["abc:batchUpdate"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/v4/spreadsheets/abc:batchUpdate");
    }

    #[test]
    fn identity_comes_from_the_key() {
        let api = api(SHEETS_API_BASE);
        assert_eq!(api.service_account_email(), "svc@proj.iam.gserviceaccount.com");
        assert_eq!(api.project_id(), Some("proj"));
    }

    #[test]
    fn cells_render_as_text() {
        assert_eq!(cell_text(json!("Name")), "Name");
        assert_eq!(cell_text(json!(42)), "42");
        assert_eq!(cell_text(Value::Null), "");
    }
}
