//! Push delivery through the FCM HTTP API.
//!
//! When `FCM_SERVER_KEY` is unset the sender degrades to a no-op that
//! reports every token as failed, matching the behavior of the rest of the
//! server when upstream credentials are missing.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};

const FCM_SEND_URL: &str = "https://fcm.googleapis.com/fcm/send";

/// Notification content to deliver.
#[derive(Debug, Clone)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    /// Extra key/value payload forwarded in the FCM data field.
    pub data: Value,
}

/// Outcome of a single-token send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Delivered,
    /// The gateway rejected the token as unregistered or malformed.
    InvalidToken,
    Failed,
}

/// Aggregate result of a multi-token send.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushReport {
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    #[serde(default)]
    success: u32,
    #[serde(default)]
    results: Vec<FcmResult>,
}

#[derive(Debug, Deserialize)]
struct FcmResult {
    #[serde(default)]
    error: Option<String>,
}

/// Push sender, either a live FCM client or a no-op.
#[derive(Clone)]
pub enum PushSender {
    Fcm(FcmSender),
    Noop,
}

impl PushSender {
    /// Build from the configured server key.
    #[must_use]
    pub fn new(server_key: Option<SecretString>) -> Self {
        server_key.map_or(Self::Noop, |key| {
            Self::Fcm(FcmSender {
                client: reqwest::Client::new(),
                server_key: key,
            })
        })
    }

    /// Whether real delivery is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        matches!(self, Self::Fcm(_))
    }

    /// Deliver a message to a single token.
    pub async fn send(&self, token: &str, message: &PushMessage) -> PushOutcome {
        match self {
            Self::Fcm(sender) => sender.send(token, message).await,
            Self::Noop => {
                tracing::warn!("Push delivery not configured, dropping notification");
                PushOutcome::Failed
            }
        }
    }
}

/// Live FCM sender.
#[derive(Clone)]
pub struct FcmSender {
    client: reqwest::Client,
    server_key: SecretString,
}

impl FcmSender {
    async fn send(&self, token: &str, message: &PushMessage) -> PushOutcome {
        let mut data = json!({
            "title": message.title,
            "body": message.body,
            "imageUrl": message.image_url.clone().unwrap_or_default(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        if let (Some(target), Some(extra)) = (data.as_object_mut(), message.data.as_object()) {
            for (k, v) in extra {
                target.insert(k.clone(), v.clone());
            }
        }

        let body = json!({
            "to": token,
            "priority": "high",
            "notification": {
                "title": message.title,
                "body": message.body,
                "image": message.image_url,
            },
            "data": data,
        });

        let response = match self
            .client
            .post(FCM_SEND_URL)
            .header(
                "Authorization",
                format!("key={}", self.server_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "FCM request failed");
                return PushOutcome::Failed;
            }
        };

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "FCM returned non-success status");
            return PushOutcome::Failed;
        }

        match response.json::<FcmResponse>().await {
            Ok(parsed) => {
                if parsed.success > 0 {
                    return PushOutcome::Delivered;
                }
                let invalid = parsed.results.iter().any(|r| {
                    matches!(
                        r.error.as_deref(),
                        Some("NotRegistered" | "InvalidRegistration" | "MissingRegistration")
                    )
                });
                if invalid {
                    PushOutcome::InvalidToken
                } else {
                    PushOutcome::Failed
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse FCM response");
                PushOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn noop_when_key_missing() {
        let sender = PushSender::new(None);
        assert!(!sender.is_configured());

        let sender = PushSender::new(Some(SecretString::from("AAAA-server-key")));
        assert!(sender.is_configured());
    }

    #[tokio::test]
    async fn noop_send_reports_failure() {
        let sender = PushSender::new(None);
        let message = PushMessage {
            title: "Hi".to_string(),
            body: "There".to_string(),
            image_url: None,
            data: json!({}),
        };
        assert_eq!(sender.send("tok", &message).await, PushOutcome::Failed);
    }

    #[test]
    fn fcm_response_detects_invalid_token() {
        let raw = r#"{"success":0,"failure":1,"results":[{"error":"NotRegistered"}]}"#;
        let parsed: FcmResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.success, 0);
        assert_eq!(parsed.results.first().unwrap().error.as_deref(), Some("NotRegistered"));
    }
}
