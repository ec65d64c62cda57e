//! Per-connection session state machine.
//!
//! Each WebSocket connection owns one [`Session`]: the authentication
//! gate, at most one live log-source attachment, and the single teardown
//! routine shared by stop, re-attach, and connection close.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use dockwatch_core::{ClientMessage, ContainerInfo, Error, LogEvent, Result, ServerMessage};
use dockwatch_docker::{DockerEngine, LogStream};

use crate::auth::Auth;

/// Engine operations the session needs. A seam so the state machine can be
/// driven by a mock engine in tests, independent of the transport.
#[async_trait]
pub trait Engine: Send + Sync + 'static {
    /// Resolve a container for attachment by exact name.
    async fn resolve(&self, name: &str) -> Result<ContainerInfo>;

    /// Attach to the container's combined stdout/stderr stream.
    async fn attach(&self, container: &ContainerInfo) -> Result<LogStream>;
}

#[async_trait]
impl Engine for DockerEngine {
    async fn resolve(&self, name: &str) -> Result<ContainerInfo> {
        Self::resolve(self, name).await
    }

    async fn attach(&self, container: &ContainerInfo) -> Result<LogStream> {
        Ok(LogStream::start(self.docker().clone(), container))
    }
}

/// Authentication progress of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Unauthenticated,
    Idle,
    Streaming,
}

/// The live binding between a session and one container's log source.
///
/// The forward task owns the [`LogStream`]; aborting the task drops the
/// stream, which cancels the engine-side follow.
struct Attachment {
    container_name: String,
    forward: JoinHandle<()>,
}

/// One duplex connection's state.
///
/// Owned exclusively by the connection's task; dropping it releases any
/// active attachment.
pub struct Session<E: Engine> {
    id: Uuid,
    engine: Option<Arc<E>>,
    auth: Auth,
    outbound: mpsc::Sender<ServerMessage>,
    state: SessionState,
    attachment: Option<Attachment>,
}

impl<E: Engine> Session<E> {
    /// Create a session for a freshly opened connection.
    ///
    /// `engine` is `None` when the Docker daemon was unreachable, in which
    /// case container operations answer with an unavailability error.
    pub fn new(engine: Option<Arc<E>>, auth: Auth, outbound: mpsc::Sender<ServerMessage>) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(session = %id, "client connected for log monitoring");
        Self {
            id,
            engine,
            auth,
            outbound,
            state: SessionState::Unauthenticated,
            attachment: None,
        }
    }

    /// Handle one text frame from the client.
    ///
    /// Returns `false` when the connection must close; authentication
    /// failure is the only forcible close in the protocol.
    pub async fn handle_text(&mut self, text: &str) -> bool {
        self.reap_dead_attachment();

        let message = match ClientMessage::parse(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(session = %self.id, "rejected frame: {e}");
                self.send_error("Invalid message format").await;
                return true;
            }
        };

        match message {
            ClientMessage::Authenticate { token } => self.authenticate(&token).await,
            _ if self.state == SessionState::Unauthenticated => {
                self.send_error("WebSocket not authenticated").await;
                true
            }
            ClientMessage::Start { container_name } => {
                self.start(&container_name).await;
                true
            }
            ClientMessage::Stop => {
                self.stop().await;
                true
            }
        }
    }

    async fn authenticate(&mut self, token: &str) -> bool {
        match self.auth.verify(token) {
            Ok(claims) => {
                tracing::debug!(session = %self.id, user = %claims.sub, "authenticated");
                if self.state == SessionState::Unauthenticated {
                    self.state = SessionState::Idle;
                }
                self.send(ServerMessage::Authenticated).await;
                true
            }
            Err(e) => {
                tracing::warn!(session = %self.id, "authentication failed: {e}");
                self.send_error("Authentication failed").await;
                false
            }
        }
    }

    async fn start(&mut self, name: &str) {
        let Some(engine) = self.engine.clone() else {
            self.send_error(
                "Docker is not available. Please ensure Docker is running and accessible.",
            )
            .await;
            return;
        };

        // Mandatory cleanup: the previous attachment is fully released
        // before the new one may emit anything.
        self.teardown().await;
        self.state = SessionState::Idle;

        let container = match engine.resolve(name).await {
            Ok(container) => container,
            Err(Error::NotFound(_)) => {
                self.send_error(&format!("Container '{name}' not found")).await;
                return;
            }
            Err(e) => {
                tracing::error!(session = %self.id, "resolve failed: {e}");
                self.send_error(&format!("Failed to resolve container: {e}")).await;
                return;
            }
        };

        let stream = match engine.attach(&container).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(session = %self.id, "attach failed: {e}");
                self.send_error(&format!("Log stream error: {e}")).await;
                return;
            }
        };

        self.send(ServerMessage::Connected {
            container_name: container.name.clone(),
        })
        .await;

        let outbound = self.outbound.clone();
        let forward = tokio::spawn(async move {
            let mut stream = stream;
            while let Some(event) = stream.rx.recv().await {
                if forward_event(&outbound, event).await.is_err() {
                    break;
                }
            }
        });

        self.attachment = Some(Attachment {
            container_name: container.name,
            forward,
        });
        self.state = SessionState::Streaming;
    }

    async fn stop(&mut self) {
        self.teardown().await;
        self.state = SessionState::Idle;
        self.send(ServerMessage::Disconnected).await;
    }

    /// The single teardown routine used by stop and re-attach. Idempotent.
    ///
    /// Waits for the forward task to actually terminate: on a multithreaded
    /// runtime an aborted task can otherwise still push one more event after
    /// the next attachment's `connected` marker.
    async fn teardown(&mut self) {
        if let Some(attachment) = self.release() {
            let _ = attachment.forward.await;
        }
    }

    /// Request cancellation of the current attachment, if any. The sync half
    /// of teardown, also used on connection close where awaiting is not
    /// possible.
    fn release(&mut self) -> Option<Attachment> {
        let attachment = self.attachment.take()?;
        tracing::debug!(
            session = %self.id,
            container = %attachment.container_name,
            "releasing log source"
        );
        attachment.forward.abort();
        Some(attachment)
    }

    /// A forward task that ended on its own means the source failed and was
    /// torn down engine-side; the session is no longer streaming.
    fn reap_dead_attachment(&mut self) {
        let dead = self
            .attachment
            .as_ref()
            .is_some_and(|attachment| attachment.forward.is_finished());
        if dead {
            self.attachment = None;
            self.state = SessionState::Idle;
            tracing::debug!(session = %self.id, "log source ended, session idle");
        }
    }

    /// Whether the session currently holds a live attachment.
    pub fn is_streaming(&self) -> bool {
        self.state == SessionState::Streaming
    }

    async fn send(&self, message: ServerMessage) {
        // The connection going away mid-send is handled by the read loop.
        let _ = self.outbound.send(message).await;
    }

    async fn send_error(&self, message: &str) {
        self.send(ServerMessage::Error {
            message: message.to_string(),
        })
        .await;
    }
}

impl<E: Engine> Drop for Session<E> {
    fn drop(&mut self) {
        self.release();
        tracing::info!(session = %self.id, "client disconnected");
    }
}

/// Forward one in-transit event to the connection's outbound channel.
async fn forward_event(
    outbound: &mpsc::Sender<ServerMessage>,
    event: LogEvent,
) -> std::result::Result<(), mpsc::error::SendError<ServerMessage>> {
    outbound.send(ServerMessage::from_event(event)).await
}
