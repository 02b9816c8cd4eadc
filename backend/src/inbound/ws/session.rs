//! Per-connection WebSocket handler.
//!
//! A session registers with the connection registry, queues the current
//! catalogue and message log, then multiplexes three sources: heartbeat
//! ticks, inbound client frames, and its outbound queue. Every frame the
//! client receives (initial snapshots, broadcasts, error acknowledgements)
//! goes through that queue, so the client sees them in the order they were
//! produced. Initial snapshots carry their read sequence number; one that
//! an earlier broadcast has already overtaken is dropped.
//!
//! The public WebSocket contract pings every 5s and considers a connection
//! idle after 10s without client traffic. Tests shorten these intervals.

use std::time::{Duration, Instant};

use actix_ws::{CloseCode, CloseReason, Closed, Message, MessageStream, ProtocolError, Session};
use tokio::time;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::domain::{
    BroadcastCoordinator, Collection, DomainError, NewMessage, ProductRecord, SnapshotSeq,
};
use crate::inbound::ws::connections::{ConnectionId, ConnectionManager, Delivery, Outbound};
use crate::inbound::ws::messages::{ClientEvent, ServerEvent};
use crate::inbound::ws::state::WsState;

/// Time between heartbeats to the client (5s in production, shorter in tests).
#[cfg(not(test))]
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
#[cfg(test)]
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(250);

/// Max idle time before disconnecting the client (10s in production, shorter in tests).
#[cfg(not(test))]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
#[cfg(test)]
const CLIENT_TIMEOUT: Duration = Duration::from_secs(1);

pub(super) async fn handle_ws_session(state: WsState, session: Session, stream: MessageStream) {
    let WsState {
        coordinator,
        connections,
        ..
    } = state;
    let (id, outbound) = connections.register();
    let span = info_span!("ws_session", connection_id = %id);

    let ws = WsSession {
        id,
        coordinator,
        connections: &connections,
    };
    ws.run(session, stream, outbound).instrument(span).await;

    connections.deregister(id);
}

enum SessionError {
    ClientClosed(Option<CloseReason>),
    StreamClosed,
    Deregistered,
    HeartbeatTimeout,
    Protocol(ProtocolError),
    Network(Closed),
}

enum CloseAction {
    None,
    Close(Option<CloseReason>),
}

struct WsSession<'a> {
    id: ConnectionId,
    coordinator: BroadcastCoordinator,
    connections: &'a ConnectionManager,
}

impl WsSession<'_> {
    async fn run(&self, mut session: Session, mut stream: MessageStream, mut outbound: Outbound) {
        info!("client connected");
        let mut last_heartbeat = Instant::now();
        let mut heartbeat = time::interval(HEARTBEAT_INTERVAL);

        let mut result = self.queue_initial_snapshots().await;
        while result.is_ok() {
            result = tokio::select! {
                _ = heartbeat.tick() => {
                    self.handle_heartbeat_tick(&mut session, &last_heartbeat).await
                }
                message = stream.recv() => {
                    self.handle_stream_message(&mut session, &mut last_heartbeat, message)
                        .await
                }
                frame = outbound.recv() => {
                    Self::flush_frame(&mut session, frame).await
                }
            };
        }

        if let Err(error) = result {
            self.log_shutdown_reason(&error);
            let close_action = self.close_action_for(&error);
            self.close_session_if_needed(session, close_action).await;
        }
    }

    async fn queue_initial_snapshots(&self) -> Result<(), SessionError> {
        match self.coordinator.product_snapshot().await {
            Ok(products) => self.queue_snapshot(
                Collection::Products,
                products.seq,
                &ServerEvent::Products(&products.snapshot),
            )?,
            Err(error) => self.acknowledge_failure(&DomainError::from(error))?,
        }
        match self.coordinator.message_snapshot().await {
            Ok(messages) => self.queue_snapshot(
                Collection::Messages,
                messages.seq,
                &ServerEvent::Messages(&messages.snapshot),
            )?,
            Err(error) => self.acknowledge_failure(&DomainError::from(error))?,
        }
        Ok(())
    }

    async fn flush_frame(session: &mut Session, frame: Option<String>) -> Result<(), SessionError> {
        let Some(frame) = frame else {
            return Err(SessionError::Deregistered);
        };
        session.text(frame).await.map_err(SessionError::Network)
    }

    async fn handle_heartbeat_tick(
        &self,
        session: &mut Session,
        last_heartbeat: &Instant,
    ) -> Result<(), SessionError> {
        if Instant::now().duration_since(*last_heartbeat) > CLIENT_TIMEOUT {
            return Err(SessionError::HeartbeatTimeout);
        }

        session.ping(b"").await.map_err(SessionError::Network)
    }

    async fn handle_stream_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Option<Result<Message, ProtocolError>>,
    ) -> Result<(), SessionError> {
        let Some(message) = message else {
            return Err(SessionError::StreamClosed);
        };

        match message {
            Ok(message) => self.handle_message(session, last_heartbeat, message).await,
            Err(error) => Err(SessionError::Protocol(error)),
        }
    }

    async fn handle_message(
        &self,
        session: &mut Session,
        last_heartbeat: &mut Instant,
        message: Message,
    ) -> Result<(), SessionError> {
        match message {
            Message::Ping(payload) => {
                *last_heartbeat = Instant::now();
                session
                    .pong(&payload)
                    .await
                    .map_err(SessionError::Network)?;
                Ok(())
            }
            Message::Text(text) => {
                *last_heartbeat = Instant::now();
                self.handle_text_message(text.as_ref()).await
            }
            Message::Pong(_) | Message::Binary(_) | Message::Continuation(_) | Message::Nop => {
                *last_heartbeat = Instant::now();
                Ok(())
            }
            Message::Close(reason) => Err(SessionError::ClientClosed(reason)),
        }
    }

    async fn handle_text_message(&self, text: &str) -> Result<(), SessionError> {
        let outcome = match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => self.dispatch(event).await,
            Err(error) => {
                warn!(error = %error, "Rejected malformed WebSocket payload");
                Err(DomainError::validation_failure(format!(
                    "malformed event: {error}"
                )))
            }
        };

        match outcome {
            Ok(()) => Ok(()),
            Err(failure) => self.acknowledge_failure(&failure),
        }
    }

    async fn dispatch(&self, event: ClientEvent) -> Result<(), DomainError> {
        match event {
            ClientEvent::Update(request) => {
                let product = ProductRecord::try_from(request)?;
                let sessions = self.coordinator.handle_product_update(product).await?;
                debug!(sessions, "product update handled");
            }
            ClientEvent::NewMessage(request) => {
                let draft = NewMessage::try_from(request)?;
                let sessions = self.coordinator.handle_new_message(draft).await?;
                debug!(sessions, "new message handled");
            }
        }
        Ok(())
    }

    fn acknowledge_failure(&self, failure: &DomainError) -> Result<(), SessionError> {
        debug!(
            code = ?failure.code(),
            reason = failure.message(),
            "sending error acknowledgement"
        );
        self.queue(&ServerEvent::Error(failure))
    }

    fn queue(&self, event: &ServerEvent<'_>) -> Result<(), SessionError> {
        let Some(frame) = serialise(event) else {
            return Ok(());
        };
        if self.connections.send_to(self.id, frame) {
            Ok(())
        } else {
            Err(SessionError::Deregistered)
        }
    }

    fn queue_snapshot(
        &self,
        collection: Collection,
        seq: SnapshotSeq,
        event: &ServerEvent<'_>,
    ) -> Result<(), SessionError> {
        let Some(frame) = serialise(event) else {
            return Ok(());
        };
        match self
            .connections
            .send_snapshot(self.id, collection, seq, frame)
        {
            Delivery::Queued => Ok(()),
            Delivery::Superseded => {
                debug!(?collection, seq, "initial snapshot overtaken by a broadcast");
                Ok(())
            }
            Delivery::Gone => Err(SessionError::Deregistered),
        }
    }

    fn log_shutdown_reason(&self, error: &SessionError) {
        match error {
            SessionError::HeartbeatTimeout => {
                warn!("WebSocket heartbeat timeout; closing connection");
            }
            SessionError::Protocol(error) => {
                warn!(error = %error, "WebSocket protocol error");
            }
            SessionError::Network(error) => {
                warn!(error = %error, "WebSocket send failed; closing connection");
            }
            SessionError::Deregistered => {
                warn!("session removed from registry; closing connection");
            }
            SessionError::ClientClosed(_) | SessionError::StreamClosed => {
                info!("client disconnected");
            }
        }
    }

    fn close_action_for(&self, error: &SessionError) -> CloseAction {
        match error {
            SessionError::HeartbeatTimeout => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Normal,
                description: Some("heartbeat timeout".to_owned()),
            })),
            SessionError::Protocol(_) => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Protocol,
                description: Some("protocol error".to_owned()),
            })),
            SessionError::Deregistered => CloseAction::Close(Some(CloseReason {
                code: CloseCode::Away,
                description: Some("session closed".to_owned()),
            })),
            SessionError::ClientClosed(reason) => CloseAction::Close(reason.clone()),
            SessionError::StreamClosed | SessionError::Network(_) => CloseAction::None,
        }
    }

    async fn close_session_if_needed(&self, session: Session, close_action: CloseAction) {
        if let CloseAction::Close(reason) = close_action {
            if let Err(error) = session.close(reason).await {
                warn!(error = %error, "Failed to close WebSocket session");
            }
        }
    }
}

fn serialise(event: &ServerEvent<'_>) -> Option<String> {
    serde_json::to_string(event)
        .inspect_err(|error| {
            error!(
                event = event.name(),
                error = %error,
                "Failed to serialise WebSocket event"
            );
        })
        .ok()
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
