use crate::config::AppConfig;
use arena_common::messages::{OutboundMessage, PushMessage};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, trace, warn};
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    select,
    sync::mpsc,
    time::{Duration, sleep},
};
use tokio_tungstenite::{WebSocketStream, connect_async, tungstenite::Message};

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("The arena closed the connection")]
    Closed,
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("Failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Keeps a connection to the arena open for as long as the display is running, forwarding every
/// decoded push message to `tx` and sending everything received on `outbound`.
#[tokio::main]
pub async fn networking_thread(
    tx: crossbeam_channel::Sender<PushMessage>,
    mut outbound: mpsc::Receiver<OutboundMessage>,
    config: AppConfig,
) {
    let url = config.websocket_url();
    let reconnect_delay = Duration::from_millis(config.reconnect_delay_ms);

    loop {
        info!("Attempting arena connection at {url}");
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                info!("Connected to arena!");
                match run_connection(stream, &tx, &mut outbound).await {
                    Ok(()) => {
                        info!("Display shut down, stopping networking thread");
                        return;
                    }
                    Err(NetworkError::Closed) => warn!("Arena closed the connection"),
                    Err(e) => error!("Connection to arena lost: {e}"),
                }
            }
            Err(e) => debug!("Arena connection failed: {e}"),
        }
        sleep(reconnect_delay).await;
    }
}

/// Runs one connection until it fails. Returns `Ok` only once the display side has hung up.
pub async fn run_connection<S>(
    stream: WebSocketStream<S>,
    tx: &crossbeam_channel::Sender<PushMessage>,
    outbound: &mut mpsc::Receiver<OutboundMessage>,
) -> Result<(), NetworkError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut write, mut read) = stream.split();

    loop {
        select! {
            frame = read.next() => {
                match frame.ok_or(NetworkError::Closed)?? {
                    Message::Text(text) => match PushMessage::decode(text.as_str()) {
                        Ok(Some(msg)) => {
                            trace!("Received {} message", msg.kind());
                            if tx.send(msg).is_err() {
                                return Ok(());
                            }
                        }
                        Ok(None) => {}
                        Err(e) => warn!("Discarding message from arena: {e}"),
                    },
                    Message::Close(_) => return Err(NetworkError::Closed),
                    _ => {}
                }
            }
            msg = outbound.recv() => {
                let Some(msg) = msg else {
                    return Ok(());
                };
                info!("Sending {msg:?} to arena");
                write.send(Message::Text(msg.encode()?.into())).await?;
            }
        }
    }
}
