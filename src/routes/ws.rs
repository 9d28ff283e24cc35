// WebSocket handler: one observer per connection, seeded on connect, pushed every cycle

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::broadcaster::{Broadcaster, Observer, Payload};

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);

pub(super) async fn ws_metrics(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let broadcaster = state.broadcaster.clone();
    let buffer = state.config.monitoring.observer_buffer;
    let send_timeout = Duration::from_millis(state.config.monitoring.send_timeout_ms);
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_metrics(socket, broadcaster, buffer, send_timeout).await {
            tracing::info!("Metrics stream error: {}", e);
        }
    })
}

async fn stream_metrics(
    socket: WebSocket,
    broadcaster: Arc<Broadcaster>,
    buffer: usize,
    send_timeout: Duration,
) -> anyhow::Result<()> {
    let (observer, rx) = Observer::channel(buffer);
    let id = observer.id();
    let (sink, mut stream) = socket.split();
    let mut writer = tokio::spawn(write_payloads(sink, rx, send_timeout));

    // The seed lands in the channel; the writer task forwards it before any broadcast.
    if let Err(e) = broadcaster.register(observer).await {
        writer.abort();
        return Err(e.into());
    }

    loop {
        tokio::select! {
            msg = stream.next() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            _ = &mut writer => break,
        }
    }
    broadcaster.unregister(id);
    writer.abort();
    Ok(())
}

/// Drains the observer channel onto the socket. Ends when the channel closes or a send
/// fails; dropping `rx` then marks the observer dead for the next broadcast.
async fn write_payloads(
    mut sink: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Payload>,
    send_timeout: Duration,
) {
    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ping_interval.reset();
    loop {
        tokio::select! {
            payload = rx.recv() => {
                let Some(payload) = payload else { break };
                let r = timeout(send_timeout, sink.send(Message::Text(payload.to_string().into()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(send_timeout, sink.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    let _ = sink.close().await;
}
