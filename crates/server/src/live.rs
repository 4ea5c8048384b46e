// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live visit event streaming.
//!
//! Every visit event the handlers publish is fanned out to connected
//! WebSocket clients. The stream is informational: clients read
//! authoritative state over HTTP and nothing sent by a client is executed.

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};
use visit_scheduler_api::{VisitEvent, VisitEventPublisher};

/// Events buffered per client before the slowest ones start losing events.
const EVENT_BUFFER_SIZE: usize = 256;

/// A message on the live stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A visit changed state.
    Visit {
        /// The published event.
        event: VisitEvent,
    },
    /// Sent once when a client connects.
    Connected {
        /// Server time (RFC 3339, UTC).
        timestamp: String,
    },
}

/// Fans published visit events out to every live client.
#[derive(Clone)]
pub struct LiveEventBroadcaster {
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveEventBroadcaster {
    /// Creates a broadcaster with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Sends an event to every subscriber; dropped when nobody listens.
    pub fn broadcast(&self, event: &LiveEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => debug!(?event, receivers = count, "Broadcast live event"),
            Err(_) => debug!(?event, "No receivers for live event"),
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl VisitEventPublisher for LiveEventBroadcaster {
    fn publish(&self, event: &VisitEvent) {
        info!(
            event_type = %event.event_type,
            reference = %event.reference,
            prison_code = %event.prison_code,
            event_id = event.event_id,
            "Visit event"
        );
        self.broadcast(&LiveEvent::Visit {
            event: event.clone(),
        });
    }
}

/// Upgrades `GET /live` to a WebSocket carrying [`LiveEvent`]s.
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    AxumState(broadcaster): AxumState<Arc<LiveEventBroadcaster>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

async fn handle_socket(socket: WebSocket, broadcaster: Arc<LiveEventBroadcaster>) {
    info!("Client connected to live event stream");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = broadcaster.subscribe();

    let connected = LiveEvent::Connected {
        timestamp: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("unknown")),
    };
    if let Ok(json) = serde_json::to_string(&connected)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live client lagging, events dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!(?e, "Failed to serialize live event"),
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    warn!("Ignoring message from live client");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!("Client disconnected from live event stream");
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use visit_scheduler_api::VisitEventType;

    fn visit_event(event_type: VisitEventType) -> VisitEvent {
        VisitEvent {
            event_type,
            reference: String::from("ab-cd-ef-gh"),
            prison_code: String::from("HEI"),
            prisoner_id: String::from("A1234BC"),
            occurred_at: String::from("2026-02-20T10:00:00"),
            event_id: 1,
        }
    }

    #[test]
    fn test_broadcast_without_receivers_is_dropped() {
        let broadcaster = LiveEventBroadcaster::new();
        assert_eq!(broadcaster.tx.receiver_count(), 0);
        broadcaster.publish(&visit_event(VisitEventType::Booked));
    }

    #[test]
    fn test_published_event_reaches_every_subscriber() {
        let broadcaster = LiveEventBroadcaster::new();
        let mut first = broadcaster.subscribe();
        let mut second = broadcaster.subscribe();

        broadcaster.publish(&visit_event(VisitEventType::Cancelled));

        let expected = LiveEvent::Visit {
            event: visit_event(VisitEventType::Cancelled),
        };
        assert_eq!(first.try_recv().unwrap(), expected);
        assert_eq!(second.try_recv().unwrap(), expected);
    }

    #[test]
    fn test_live_event_json_shape() {
        let json = serde_json::to_value(LiveEvent::Visit {
            event: visit_event(VisitEventType::Changed),
        })
        .unwrap();

        assert_eq!(json["type"], "visit");
        assert_eq!(json["event"]["event_type"], "prison-visit.changed");
        assert_eq!(json["event"]["reference"], "ab-cd-ef-gh");
    }
}
