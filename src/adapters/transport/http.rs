//! HTTP(S) transport
//!
//! Messages are POSTed as `application/x-hl7` with an optional
//! `Authorization: Bearer` header. The connection probe is a GET to
//! `<destination>/health`.

use super::{MessageTransport, TransportReceipt};
use crate::config::{schema::validate_destination, TransportConfig};
use crate::domain::{Hl7Error, Result, TransportError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Content type of an HL7 v2 pipe-encoded body
pub const HL7_CONTENT_TYPE: &str = "application/x-hl7";

const HEALTH_PATH: &str = "health";
const CONNECT_TIMEOUT_SECONDS: u64 = 10;

/// HTTP implementation of [`MessageTransport`]
///
/// # Example
///
/// ```no_run
/// use emr_hl7::adapters::transport::{HttpTransport, MessageTransport};
/// use emr_hl7::config::TransportConfig;
///
/// # async fn example(raw: &str) -> emr_hl7::domain::Result<()> {
/// let transport = HttpTransport::new(&TransportConfig::default())?;
/// let receipt = transport.send(raw, "https://his.example.org/hl7").await?;
/// println!("remote answered {}", receipt.status);
/// # Ok(())
/// # }
/// ```
pub struct HttpTransport {
    client: Client,
    auth_header: Option<String>,
    health_timeout: Duration,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("authenticated", &self.auth_header.is_some())
            .field("health_timeout", &self.health_timeout)
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport from the `[transport]` configuration section
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECONDS));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled for the HL7 transport");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            Hl7Error::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        let auth_header = config
            .auth_token
            .as_ref()
            .map(|token| token.expose_secret().bearer());

        Ok(Self {
            client,
            auth_header,
            health_timeout: Duration::from_secs(config.health_timeout_seconds),
        })
    }
}

fn check_destination(destination: &str) -> Result<()> {
    validate_destination(destination)
        .map_err(|e| Hl7Error::Transport(TransportError::InvalidDestination(e)))
}

fn health_url(destination: &str) -> String {
    format!("{}/{HEALTH_PATH}", destination.trim_end_matches('/'))
}

fn map_send_error(err: reqwest::Error) -> Hl7Error {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string()).into()
    } else {
        TransportError::ConnectionFailed(err.to_string()).into()
    }
}

fn map_status(status: StatusCode, body: String) -> Hl7Error {
    let message = if body.is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        body
    };

    if status.is_server_error() {
        TransportError::ServerError {
            status: status.as_u16(),
            message,
        }
        .into()
    } else {
        TransportError::ClientError {
            status: status.as_u16(),
            message,
        }
        .into()
    }
}

#[async_trait]
impl MessageTransport for HttpTransport {
    async fn send(&self, message: &str, destination: &str) -> Result<TransportReceipt> {
        check_destination(destination)?;

        tracing::debug!(
            destination = %destination,
            bytes = message.len(),
            "Sending HL7 message"
        );

        let mut request = self
            .client
            .post(destination)
            .header(reqwest::header::CONTENT_TYPE, HL7_CONTENT_TYPE)
            .body(message.to_string());

        if let Some(ref auth) = self.auth_header {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await.map_err(map_send_error)?;
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    destination = %destination,
                    status = status.as_u16(),
                    error = %e,
                    "Failed to read HL7 response body"
                );
                String::new()
            }
        };

        if !status.is_success() {
            tracing::warn!(
                destination = %destination,
                status = status.as_u16(),
                "HL7 message rejected by destination"
            );
            return Err(map_status(status, body));
        }

        tracing::info!(
            destination = %destination,
            status = status.as_u16(),
            "HL7 message sent"
        );

        Ok(TransportReceipt {
            status: status.as_u16(),
            body,
        })
    }

    async fn check_connection(&self, destination: &str) -> Result<bool> {
        check_destination(destination)?;
        let url = health_url(destination);

        match self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => {
                let healthy = response.status().is_success();
                tracing::info!(
                    url = %url,
                    status = response.status().as_u16(),
                    healthy,
                    "HL7 connection check"
                );
                Ok(healthy)
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "HL7 connection check failed");
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use mockito::Matcher;

    const ADT: &str = "MSH|^~\\&|EMR|HOSPITAL|HIS|HOSPITAL|20240301083000||ADT^A01|M1|P|2.5\r";

    fn transport(token: Option<&str>) -> HttpTransport {
        let config = TransportConfig {
            auth_token: token.map(|t| secret_string(t.to_string())),
            timeout_seconds: 5,
            health_timeout_seconds: 2,
            ..Default::default()
        };
        HttpTransport::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_send_keeps_status_when_body_is_truncated() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buffer = [0u8; 1024];
            while !request.ends_with(ADT.as_bytes()) {
                let read = socket.read(&mut buffer).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buffer[..read]);
            }
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 64\r\n\r\nMSA|AA")
                .await
                .unwrap();
        });

        let receipt = transport(None)
            .send(ADT, &format!("http://{address}/hl7"))
            .await
            .unwrap();

        assert_eq!(receipt.status, 200);
        assert!(receipt.body.is_empty());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_send_posts_hl7_with_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hl7")
            .match_header("content-type", HL7_CONTENT_TYPE)
            .match_header("authorization", "Bearer his-token")
            .match_body(ADT)
            .with_status(200)
            .with_body("MSH|^~\\&|HIS|HOSPITAL|EMR|HOSPITAL|20240301083001||ACK^A01|A1|P|2.5\rMSA|AA|M1\r")
            .create_async()
            .await;

        let receipt = transport(Some("his-token"))
            .send(ADT, &format!("{}/hl7", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(receipt.status, 200);
        assert!(receipt.body.contains("MSA|AA|M1"));
    }

    #[tokio::test]
    async fn test_send_without_token_omits_authorization() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hl7")
            .match_header("authorization", Matcher::Missing)
            .with_status(202)
            .create_async()
            .await;

        let receipt = transport(None)
            .send(ADT, &format!("{}/hl7", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(receipt.status, 202);
    }

    #[tokio::test]
    async fn test_send_maps_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/hl7")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let err = transport(None)
            .send(ADT, &format!("{}/hl7", server.url()))
            .await
            .unwrap_err();

        match err {
            Hl7Error::Transport(TransportError::ServerError { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_maps_client_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/hl7")
            .with_status(401)
            .create_async()
            .await;

        let err = transport(None)
            .send(ADT, &format!("{}/hl7", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Hl7Error::Transport(TransportError::ClientError { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_send_rejects_invalid_destination() {
        let err = transport(None).send(ADT, "mllp://his:2575").await.unwrap_err();
        assert!(matches!(
            err,
            Hl7Error::Transport(TransportError::InvalidDestination(_))
        ));
    }

    #[tokio::test]
    async fn test_send_unreachable_destination() {
        let err = transport(None)
            .send(ADT, "http://127.0.0.1:1/hl7")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Hl7Error::Transport(TransportError::ConnectionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_check_connection_healthy() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/hl7/health")
            .with_status(200)
            .create_async()
            .await;

        let healthy = transport(None)
            .check_connection(&format!("{}/hl7/", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(healthy);
    }

    #[tokio::test]
    async fn test_check_connection_unhealthy_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/health")
            .with_status(500)
            .create_async()
            .await;

        let healthy = transport(None)
            .check_connection(&server.url())
            .await
            .unwrap();
        assert!(!healthy);
    }

    #[tokio::test]
    async fn test_check_connection_unreachable_is_false() {
        let healthy = transport(None)
            .check_connection("http://127.0.0.1:1")
            .await
            .unwrap();
        assert!(!healthy);
    }

    #[test]
    fn test_health_url() {
        assert_eq!(health_url("http://his/hl7"), "http://his/hl7/health");
        assert_eq!(health_url("http://his/hl7/"), "http://his/hl7/health");
    }

    #[test]
    fn test_debug_hides_token() {
        let t = transport(Some("his-token"));
        let rendered = format!("{t:?}");
        assert!(!rendered.contains("his-token"));
        assert!(rendered.contains("authenticated: true"));
    }
}
