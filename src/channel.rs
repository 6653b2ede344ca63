use crate::{errors::Error, sid::SessionId};
use futures_util::stream::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::{tungstenite, MaybeTlsStream, WebSocketStream};

/// One-shot source of the result pushed for a session.
#[allow(async_fn_in_trait)]
pub trait ResultChannel {
    /// Waits for the first data message. Control frames are skipped; the
    /// peer closing first is a transport error.
    async fn first_message(&mut self) -> Result<String, Error>;

    /// Releases the connection. Calling it more than once is harmless.
    async fn close(&mut self);
}

#[allow(async_fn_in_trait)]
pub trait Connector {
    type Channel: ResultChannel;

    /// Resolves once the channel is open and able to receive.
    async fn open(&self, sid: &SessionId) -> Result<Self::Channel, Error>;
}

pub struct WsConnector {
    base: String,
}

impl WsConnector {
    /// `base` is the `ws://` or `wss://` form of the backend host.
    pub fn new(base: String) -> Self {
        Self { base }
    }

    pub fn url_for(&self, sid: &SessionId) -> String {
        format!("{}/api/ws/{}", self.base, sid.as_str())
    }
}

impl Connector for WsConnector {
    type Channel = LiveChannel;

    async fn open(&self, sid: &SessionId) -> Result<LiveChannel, Error> {
        let url = self.url_for(sid);
        let (stream, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| Error::Transport(format!("failed to connect to {url}: {e}")))?;
        tracing::debug!(%sid, %url, "push channel connected");
        Ok(LiveChannel {
            stream: Some(stream),
        })
    }
}

/// WebSocket half of a session. Dropping it without `close` still releases
/// the socket, just without a close handshake.
pub struct LiveChannel {
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl ResultChannel for LiveChannel {
    async fn first_message(&mut self) -> Result<String, Error> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::Transport("channel is already closed".to_string()))?;

        while let Some(message) = stream.next().await {
            let message =
                message.map_err(|e| Error::Transport(format!("failed to read message: {e}")))?;
            match message {
                tungstenite::Message::Text(text) => return Ok(text),
                tungstenite::Message::Binary(buf) => {
                    return Ok(String::from_utf8_lossy(&buf).into_owned())
                }
                tungstenite::Message::Close(frame) => {
                    return Err(Error::Transport(format!(
                        "closed by the backend before a result arrived ({frame:?})"
                    )))
                }
                tungstenite::Message::Ping(_)
                | tungstenite::Message::Pong(_)
                | tungstenite::Message::Frame(_) => (),
            }
        }

        Err(Error::Transport(
            "connection ended before a result arrived".to_string(),
        ))
    }

    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close(None).await {
                tracing::debug!("push channel close handshake failed: {e}");
            }
        }
    }
}
