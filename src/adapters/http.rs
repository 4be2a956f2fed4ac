use crate::domain::model::{Identifier, Registration};
use crate::domain::ports::{Directory, Notifier};
use crate::domain::session::{SessionEvent, SessionState};
use crate::utils::error::{CheckerError, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const MAX_ERROR_BODY: usize = 200;

/// Client for a WhatsApp REST bridge (a Baileys or whatsapp-web.js process
/// exposing `/check`, `/send` and `/status`).
#[derive(Debug, Clone)]
pub struct BridgeClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// Bridges answer a check either with a flag or with the list of matching
/// accounts (`[{"jid": ..., "exists": true}]`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CheckReply {
    Flag { registered: bool },
    Exists { exists: bool },
    Matches(Vec<serde_json::Value>),
}

impl From<CheckReply> for Registration {
    fn from(reply: CheckReply) -> Self {
        match reply {
            CheckReply::Flag { registered } => Registration::Flag(registered),
            CheckReply::Exists { exists } => Registration::Flag(exists),
            CheckReply::Matches(items) => Registration::Matches(
                items
                    .iter()
                    .filter(|item| item.get("exists").and_then(|v| v.as_bool()) != Some(false))
                    .count(),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusReply {
    connection: String,
    #[serde(default)]
    logged_out: bool,
}

impl BridgeClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("apikey", key),
            None => request,
        }
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let url = self.endpoint(path);
        tracing::debug!("POST {}", url);
        let response = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        tracing::debug!("Bridge response status: {}", response.status());

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::status_error(response).await)
        }
    }

    async fn status_error(response: reqwest::Response) -> CheckerError {
        let status = response.status();
        match status {
            StatusCode::FORBIDDEN => CheckerError::AuthenticationError {
                status: status.as_u16(),
            },
            StatusCode::UNAUTHORIZED => {
                // bridges answer 401 both for a logged-out session and for a bad key
                let body = response.text().await.unwrap_or_default().to_lowercase();
                if body.contains("apikey") || body.contains("api key") || body.contains("api_key") {
                    CheckerError::AuthenticationError {
                        status: status.as_u16(),
                    }
                } else {
                    CheckerError::SessionUnavailable {
                        state: SessionState::LoggedOut,
                    }
                }
            }
            StatusCode::SERVICE_UNAVAILABLE => CheckerError::SessionUnavailable {
                state: SessionState::Connecting,
            },
            _ => {
                let body = response.text().await.unwrap_or_default();
                let mut body = body.trim().to_string();
                if body.len() > MAX_ERROR_BODY {
                    let cut = (0..=MAX_ERROR_BODY)
                        .rev()
                        .find(|i| body.is_char_boundary(*i))
                        .unwrap_or(0);
                    body.truncate(cut);
                }
                CheckerError::DirectoryError {
                    message: if body.is_empty() {
                        format!("bridge returned {}", status)
                    } else {
                        format!("bridge returned {}: {}", status, body)
                    },
                }
            }
        }
    }

    /// Asks the bridge for its connection state. `None` means the bridge is
    /// still connecting and there is nothing to apply yet.
    pub async fn session_event(&self) -> Result<Option<SessionEvent>> {
        let url = self.endpoint("status");
        let response = self.authorized(self.client.get(&url)).send().await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let status: StatusReply = response.json().await?;
        let event = match status.connection.as_str() {
            "open" => Some(SessionEvent::Opened),
            "close" => Some(SessionEvent::Closed {
                logged_out: status.logged_out,
            }),
            _ => None,
        };
        Ok(event)
    }
}

#[async_trait::async_trait]
impl Directory for BridgeClient {
    async fn check_registration(&self, identifier: &Identifier) -> Result<Registration> {
        let response = self.post("check", json!({ "jid": identifier.jid() })).await?;
        let reply: CheckReply = response.json().await.map_err(|e| CheckerError::DirectoryError {
            message: format!("unexpected check response: {}", e),
        })?;
        Ok(reply.into())
    }
}

#[async_trait::async_trait]
impl Notifier for BridgeClient {
    async fn send(&self, to: &Identifier, text: &str) -> Result<()> {
        self.post("send", json!({ "jid": to.jid(), "text": text }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_reply_shapes() {
        let parse = |raw: &str| -> Registration {
            serde_json::from_str::<CheckReply>(raw).unwrap().into()
        };

        assert!(parse(r#"{"registered": true}"#).is_registered());
        assert!(!parse(r#"{"registered": false}"#).is_registered());
        assert!(parse(r#"{"exists": true}"#).is_registered());
        assert!(parse(r#"[{"jid": "1@s.whatsapp.net", "exists": true}]"#).is_registered());
        assert!(!parse("[]").is_registered());
        assert!(!parse(r#"[{"jid": "1@s.whatsapp.net", "exists": false}]"#).is_registered());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = BridgeClient::new("http://127.0.0.1:3000/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(client.endpoint("check"), "http://127.0.0.1:3000/check");
    }
}
