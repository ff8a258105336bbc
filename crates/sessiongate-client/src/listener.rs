//! Reads account events from the server's WebSocket.

use futures::StreamExt;
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use sessiongate_realtime::EventEnvelope;

use crate::error::ClientError;

/// An open subscription to the caller's account channel.
///
/// Dropping the listener closes the socket, which releases the
/// subscription on the server.
#[derive(Debug)]
pub struct EventListener {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl EventListener {
    /// Connect to `{base}/ws?token=...`.
    pub async fn connect(base_url: &Url, token: &str) -> Result<Self, ClientError> {
        let url = socket_url(base_url, token)?;
        let (stream, response) = connect_async(url.as_str()).await?;
        info!(status = %response.status(), "Event socket connected");
        Ok(Self { stream })
    }

    /// Next event, or `None` once the server closes the socket.
    ///
    /// Frames that are not event envelopes are skipped.
    pub async fn next_event(&mut self) -> Result<Option<EventEnvelope>, ClientError> {
        while let Some(frame) = self.stream.next().await {
            match frame? {
                Message::Text(text) => match serde_json::from_str::<EventEnvelope>(text.as_str()) {
                    Ok(envelope) => return Ok(Some(envelope)),
                    Err(e) => warn!(error = %e, "Ignoring malformed event frame"),
                },
                Message::Close(frame) => {
                    debug!(?frame, "Event socket closed by server");
                    return Ok(None);
                }
                _ => {}
            }
        }
        Ok(None)
    }

    /// Close the socket.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Derive the WebSocket URL from an HTTP base URL.
pub(crate) fn socket_url(base_url: &Url, token: &str) -> Result<Url, ClientError> {
    let mut url = base_url.clone();
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ClientError::InvalidUrl(format!("unsupported scheme '{other}'"))),
    };
    url.set_scheme(scheme)
        .map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .push("ws");
    url.query_pairs_mut().clear().append_pair("token", token);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_url_switches_scheme() {
        let base = Url::parse("http://localhost:8000").unwrap();
        let url = socket_url(&base, "abc").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/ws?token=abc");

        let base = Url::parse("https://gate.example.com/prefix/").unwrap();
        let url = socket_url(&base, "a b").unwrap();
        assert_eq!(url.as_str(), "wss://gate.example.com/prefix/ws?token=a+b");
    }

    #[test]
    fn test_socket_url_rejects_other_schemes() {
        let base = Url::parse("ftp://example.com").unwrap();
        assert!(matches!(socket_url(&base, "t"), Err(ClientError::InvalidUrl(_))));
    }
}
