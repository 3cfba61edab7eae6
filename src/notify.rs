// Email delivery through the Postmark HTTP API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::EmailConfig;
use crate::render::Notification;

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Email API error: {status_code} - {message} (code {error_code})")]
    Rejected {
        status_code: u16,
        error_code: i64,
        message: String,
    },

    #[error("Unexpected email API response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReceipt {
    pub message_id: String,
    pub recipient: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct OutboundEmail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct PostmarkResponse {
    #[serde(rename = "MessageID")]
    message_id: String,
    to: String,
    error_code: i64,
    message: String,
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt, DeliveryError>;
}

pub struct PostmarkSender {
    config: EmailConfig,
    http: reqwest::Client,
}

impl PostmarkSender {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationSender for PostmarkSender {
    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt, DeliveryError> {
        let email = OutboundEmail {
            from: &self.config.sender,
            to: &self.config.recipient,
            subject: &notification.subject,
            html_body: &notification.html_body,
        };

        let response = self
            .http
            .post(format!("{}/email", self.config.base_url.trim_end_matches('/')))
            .header("Accept", "application/json")
            .header("X-Postmark-Server-Token", &self.config.server_token)
            .json(&email)
            .send()
            .await
            .map_err(|e| DeliveryError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body: PostmarkResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::InvalidResponse(e.to_string()))?;

        if !status.is_success() || body.error_code != 0 {
            return Err(DeliveryError::Rejected {
                status_code: status.as_u16(),
                error_code: body.error_code,
                message: body.message,
            });
        }

        info!(message_id = %body.message_id, "Email alert sent successfully");
        Ok(DeliveryReceipt {
            message_id: body.message_id,
            recipient: body.to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sender(base_url: &str) -> PostmarkSender {
        PostmarkSender::new(EmailConfig {
            base_url: base_url.to_string(),
            server_token: "pm-token".to_string(),
            sender: "alerts@example.com".to_string(),
            recipient: "me@example.com".to_string(),
        })
    }

    fn notification() -> Notification {
        Notification {
            subject: "Top 1 Cheapest Flights from LAX to GLA".to_string(),
            html_body: "<p>USD 300.00</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/email"))
            .and(header("X-Postmark-Server-Token", "pm-token"))
            .and(body_json(json!({
                "From": "alerts@example.com",
                "To": "me@example.com",
                "Subject": "Top 1 Cheapest Flights from LAX to GLA",
                "HtmlBody": "<p>USD 300.00</p>"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "To": "me@example.com",
                "SubmittedAt": "2024-11-20T09:00:00.0000000-05:00",
                "MessageID": "b7bc2f4a-e38e-4336-af7d-e6c392c2f817",
                "ErrorCode": 0,
                "Message": "OK"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = sender(&server.uri()).send(&notification()).await.unwrap();

        assert_eq!(receipt.message_id, "b7bc2f4a-e38e-4336-af7d-e6c392c2f817");
        assert_eq!(receipt.recipient, "me@example.com");
    }

    #[tokio::test]
    async fn test_send_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "ErrorCode": 300,
                "Message": "Invalid 'From' address"
            })))
            .mount(&server)
            .await;

        match sender(&server.uri()).send(&notification()).await {
            Err(DeliveryError::Rejected {
                status_code,
                error_code,
                message,
            }) => {
                assert_eq!(status_code, 422);
                assert_eq!(error_code, 300);
                assert!(message.contains("From"));
            }
            other => panic!("Expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_network_error() {
        // Nothing listens on the discard port
        let result = sender("http://127.0.0.1:9").send(&notification()).await;
        assert!(matches!(result, Err(DeliveryError::NetworkError(_))));
    }
}
