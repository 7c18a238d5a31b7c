//! Batch-update transport: the [`SheetsBatchUpdater`] seam and its reqwest implementation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::ServiceAccountAuthenticator;
use crate::spec::{
    EnumSheetFormatOperation, GSheetError, SpecServiceAccountCredentials, SpecSheetsEndpoints,
    SpecSpreadsheetTarget,
};
use crate::util::{derive_batch_update_body, derive_batch_update_url};

/// Summary of an accepted batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecBatchUpdateReply {
    /// Spreadsheet id echoed by the API.
    pub spreadsheet_id: String,
    /// One reply per submitted request.
    pub n_replies: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBatchUpdateResponse {
    #[serde(default)]
    spreadsheet_id: String,
    #[serde(default)]
    replies: Vec<Value>,
}

impl From<WireBatchUpdateResponse> for SpecBatchUpdateReply {
    fn from(wire: WireBatchUpdateResponse) -> Self {
        Self {
            spreadsheet_id: wire.spreadsheet_id,
            n_replies: wire.replies.len(),
        }
    }
}

/// Submits one ordered batch of operations against one spreadsheet.
///
/// Implementations issue exactly one batch request per call and never retry.
#[async_trait]
pub trait SheetsBatchUpdater: Send + Sync {
    async fn batch_update(
        &self,
        credentials: &SpecServiceAccountCredentials,
        target: &SpecSpreadsheetTarget,
        operations: &[EnumSheetFormatOperation],
    ) -> Result<SpecBatchUpdateReply, GSheetError>;
}

/// HTTP client for the Sheets API v4.
#[derive(Debug, Clone)]
pub struct SheetsHttpClient {
    client: reqwest::Client,
    endpoints: SpecSheetsEndpoints,
    authenticator: ServiceAccountAuthenticator,
}

impl SheetsHttpClient {
    /// Client with reqwest defaults (no request timeout).
    pub fn new(endpoints: SpecSheetsEndpoints) -> Self {
        Self::with_client(endpoints, reqwest::Client::new())
    }

    /// Client over a caller-configured reqwest client (timeouts, proxies).
    pub fn with_client(endpoints: SpecSheetsEndpoints, client: reqwest::Client) -> Self {
        let authenticator = ServiceAccountAuthenticator::new(client.clone(), &endpoints.token_uri);
        Self {
            client,
            endpoints,
            authenticator,
        }
    }
}

#[async_trait]
impl SheetsBatchUpdater for SheetsHttpClient {
    async fn batch_update(
        &self,
        credentials: &SpecServiceAccountCredentials,
        target: &SpecSpreadsheetTarget,
        operations: &[EnumSheetFormatOperation],
    ) -> Result<SpecBatchUpdateReply, GSheetError> {
        let body = derive_batch_update_body(operations)?;
        let token = self.authenticator.fetch_access_token(credentials).await?;
        let url = derive_batch_update_url(&self.endpoints.sheets_api_base, &target.spreadsheet_id);

        tracing::info!(
            spreadsheet_id = %target.spreadsheet_id,
            sheet_id = target.sheet_id,
            n_requests = operations.len(),
            "submitting batch update"
        );
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&token.access_token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GSheetError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let wire: WireBatchUpdateResponse = resp.json().await?;
        Ok(SpecBatchUpdateReply::from(wire))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    const C_PEM_TEST_KEY: &str = include_str!("../testdata/rsa_test_key.pem");
    const C_BODY_TOKEN: &str =
        r#"{"access_token":"ya29.test","token_type":"Bearer","expires_in":3600}"#;

    type SpecRequestLog = Arc<Mutex<Vec<String>>>;

    /// Read one request: head up to the blank line, then `content-length` body bytes.
    async fn read_http_request(stream: &mut TcpStream) -> String {
        let mut l_bytes = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n_read = stream.read(&mut chunk).await.expect("read");
            if n_read == 0 {
                break;
            }
            l_bytes.extend_from_slice(&chunk[..n_read]);
            let Some(n_idx_head_end) = l_bytes.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&l_bytes[..n_idx_head_end]).to_ascii_lowercase();
            let n_len_body = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|val| val.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if l_bytes.len() >= n_idx_head_end + 4 + n_len_body {
                break;
            }
        }
        String::from_utf8_lossy(&l_bytes).into_owned()
    }

    /// Local Sheets stand-in: `POST /token` always grants, every other
    /// request is answered with `batch_status` / `batch_body`.
    async fn spawn_sheets_stub(
        batch_status: u16,
        batch_body: &'static str,
    ) -> (SpecSheetsEndpoints, SpecRequestLog) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let l_requests: SpecRequestLog = Arc::default();
        let l_requests_server = Arc::clone(&l_requests);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let request = read_http_request(&mut stream).await;
                let (status, body) = if request.starts_with("POST /token ") {
                    (200, C_BODY_TOKEN)
                } else {
                    (batch_status, batch_body)
                };
                l_requests_server.lock().expect("lock").push(request);

                let response = format!(
                    "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        let endpoints = SpecSheetsEndpoints {
            sheets_api_base: format!("http://{addr}/v4"),
            token_uri: format!("http://{addr}/token"),
        };
        (endpoints, l_requests)
    }

    fn derive_test_credentials() -> SpecServiceAccountCredentials {
        SpecServiceAccountCredentials {
            client_email: "svc@example.iam.gserviceaccount.com".to_string(),
            private_key: C_PEM_TEST_KEY.to_string(),
        }
    }

    #[test]
    fn reply_counts_one_entry_per_request() {
        let wire: WireBatchUpdateResponse = serde_json::from_str(
            r#"{"spreadsheetId":"abc","replies":[{},{},{},{},{}]}"#,
        )
        .expect("wire");
        let reply = SpecBatchUpdateReply::from(wire);
        assert_eq!(reply.spreadsheet_id, "abc");
        assert_eq!(reply.n_replies, 5);
    }

    #[test]
    fn reply_tolerates_missing_fields() {
        let wire: WireBatchUpdateResponse = serde_json::from_str("{}").expect("wire");
        assert_eq!(SpecBatchUpdateReply::from(wire), SpecBatchUpdateReply::default());
    }

    #[tokio::test]
    async fn invalid_batch_fails_before_any_network_io() {
        // Unroutable endpoints: reaching the network would surface as `Http`.
        let client = SheetsHttpClient::new(SpecSheetsEndpoints {
            sheets_api_base: "http://127.0.0.1:9".to_string(),
            token_uri: "http://127.0.0.1:9/token".to_string(),
        });
        let creds = SpecServiceAccountCredentials {
            client_email: "svc@example.com".to_string(),
            private_key: "unused".to_string(),
        };
        let target = SpecSpreadsheetTarget {
            spreadsheet_id: "abc".to_string(),
            sheet_id: 0,
        };
        let err = client
            .batch_update(&creds, &target, &[])
            .await
            .expect_err("must fail");
        assert!(matches!(err, GSheetError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn malformed_key_fails_before_any_network_io() {
        let client = SheetsHttpClient::new(SpecSheetsEndpoints {
            sheets_api_base: "http://127.0.0.1:9".to_string(),
            token_uri: "http://127.0.0.1:9/token".to_string(),
        });
        let creds = SpecServiceAccountCredentials {
            client_email: "svc@example.com".to_string(),
            private_key: "not a pem".to_string(),
        };
        let target = SpecSpreadsheetTarget {
            spreadsheet_id: "abc".to_string(),
            sheet_id: 0,
        };
        let l_ops = crate::conf::derive_default_sheet_format_template(0);
        let err = client
            .batch_update(&creds, &target, &l_ops)
            .await
            .expect_err("must fail");
        assert!(matches!(err, GSheetError::InvalidPrivateKey(_)));
    }

    #[tokio::test]
    async fn batch_update_sends_bearer_token_and_decodes_reply() {
        let (endpoints, l_requests) =
            spawn_sheets_stub(200, r#"{"spreadsheetId":"abc","replies":[{},{},{},{},{}]}"#).await;
        let client = SheetsHttpClient::new(endpoints);
        let target = SpecSpreadsheetTarget {
            spreadsheet_id: "abc".to_string(),
            sheet_id: 0,
        };
        let l_ops = crate::conf::derive_default_sheet_format_template(0);

        let reply = client
            .batch_update(&derive_test_credentials(), &target, &l_ops)
            .await
            .expect("reply");
        assert_eq!(
            reply,
            SpecBatchUpdateReply {
                spreadsheet_id: "abc".to_string(),
                n_replies: 5,
            }
        );

        let l_requests = l_requests.lock().expect("lock").clone();
        assert_eq!(l_requests.len(), 2);
        assert!(l_requests[0].starts_with("POST /token "));
        assert!(
            l_requests[0]
                .to_ascii_lowercase()
                .contains("grant_type=urn%3aietf%3aparams%3aoauth%3agrant-type%3ajwt-bearer")
        );
        assert!(l_requests[1].starts_with("POST /v4/spreadsheets/abc:batchUpdate "));
        assert!(
            l_requests[1]
                .to_ascii_lowercase()
                .contains("authorization: bearer ya29.test")
        );
        assert!(l_requests[1].contains("\"updateSheetProperties\""));
    }

    #[tokio::test]
    async fn batch_update_maps_non_success_status_to_api_error() {
        let (endpoints, l_requests) = spawn_sheets_stub(
            404,
            r#"{"error":{"code":404,"message":"Requested entity was not found."}}"#,
        )
        .await;
        let client = SheetsHttpClient::new(endpoints);
        let target = SpecSpreadsheetTarget {
            spreadsheet_id: "missing".to_string(),
            sheet_id: 0,
        };
        let l_ops = crate::conf::derive_default_sheet_format_template(0);

        let err = client
            .batch_update(&derive_test_credentials(), &target, &l_ops)
            .await
            .expect_err("must fail");
        match err {
            GSheetError::Api { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("Requested entity was not found."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(l_requests.lock().expect("lock").len(), 2);
    }
}
