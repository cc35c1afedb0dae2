use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use tokio::sync::broadcast;
use tokio_tungstenite::{connect_async, tungstenite::Message, tungstenite::Utf8Bytes};

use anyhow::{Context, Result};

use crate::metrics::CollectorMetrics;
use crate::schema::{FeedMessage, SubscribeRequest};
use crate::sink::RecordSink;

/// Why a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Shutdown was signalled; the supervisor must not reconnect.
    Shutdown,
    /// The connection dropped; the supervisor reconnects.
    Disconnected,
}

/// What happened to one inbound text frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A ticker record of this many bytes was appended.
    Appended(usize),
    /// The frame decoded fine but is not a ticker update.
    Filtered,
    /// The frame could not be decoded; it was dropped.
    ParseError,
    /// The record could not be appended; it was dropped.
    WriteError,
}

/// Runs exactly one WebSocket session against the feed.
///
/// This function:
/// - Connects and sends the subscription request
/// - Reads frames until the connection ends or shutdown fires
/// - Forwards each text frame through `ingest_frame`
///
/// GUARANTEES:
/// - Bad frames never end the session; only transport failures
///   and shutdown do
/// - Records reach the sink in the order the feed delivered them
///
/// NOT RESPONSIBLE FOR:
/// - Reconnecting (supervisor responsibility)
/// - Backoff timing
///
/// An `Err` means the session never got going (connect or
/// subscribe failed); the supervisor treats it like a disconnect.
pub async fn run_session(
    url: &str,
    subscribe: &SubscribeRequest,
    sink: &mut RecordSink,
    metrics: &CollectorMetrics,
    shutdown: &mut broadcast::Receiver<()>,
) -> Result<SessionEnd> {
    let (ws, _) = connect_async(url)
        .await
        .with_context(|| format!("failed to connect to {url}"))?;

    metrics.session_opened();
    info!("connected to {url}");

    let (mut write, mut read) = ws.split();

    let payload =
        serde_json::to_string(subscribe).context("failed to encode subscribe request")?;
    write
        .send(Message::Text(Utf8Bytes::from(payload)))
        .await
        .context("failed to send subscribe request")?;

    loop {
        tokio::select! {
            // Any recv result counts as shutdown: a closed channel means
            // the process is tearing down.
            _ = shutdown.recv() => {
                let _ = write.send(Message::Close(None)).await;
                info!("session closed for shutdown");
                return Ok(SessionEnd::Shutdown);
            }

            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    metrics.frame_received();
                    ingest_frame(&text, sink, metrics).await;
                }

                Some(Ok(Message::Close(_))) => {
                    info!("feed closed the connection");
                    return Ok(SessionEnd::Disconnected);
                }

                // Ignore non-text frames (ping/pong/binary)
                Some(Ok(_)) => {}

                Some(Err(e)) => {
                    warn!("websocket read error: {e}");
                    return Ok(SessionEnd::Disconnected);
                }

                None => {
                    info!("feed stream ended");
                    return Ok(SessionEnd::Disconnected);
                }
            }
        }
    }
}

/// Decides what one text frame becomes: an appended record, a
/// filtered frame, or a dropped one.
///
/// Failures are absorbed here. A frame the feed garbles or a write
/// the filesystem refuses costs that one record, never the session.
pub async fn ingest_frame(
    raw: &str,
    sink: &mut RecordSink,
    metrics: &CollectorMetrics,
) -> IngestOutcome {
    let message = match FeedMessage::parse(raw) {
        Ok(message) => message,
        Err(e) => {
            metrics.parse_error();
            warn!("dropping undecodable frame: {e}");
            return IngestOutcome::ParseError;
        }
    };

    let event = match message {
        FeedMessage::Ticker(event) => event,
        FeedMessage::Other => {
            metrics.frame_filtered();
            return IngestOutcome::Filtered;
        }
    };

    let record = event.to_record();
    match sink.append(&record).await {
        Ok(()) => {
            metrics.record_appended(record.len() as u64);
            IngestOutcome::Appended(record.len())
        }
        Err(e) => {
            metrics.write_error();
            error!("dropping record after append failure: {e:#}");
            IngestOutcome::WriteError
        }
    }
}
