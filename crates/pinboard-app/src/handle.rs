//! Intent API, notification stream, and connection setup.

use std::sync::Arc;

use pinboard_client::{MessageId, Notification, Session, SessionEvent, transport::Transport};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{AppError, ClientConfig, Input, Runtime};

/// Cloneable handle for submitting user intents.
///
/// Every method queues the intent and returns immediately. Validation
/// failures come back as [`Notification::IntentRejected`], in order with
/// everything else.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    inbox: mpsc::UnboundedSender<Input>,
}

impl ClientHandle {
    /// Handle feeding `inbox`.
    pub fn new(inbox: mpsc::UnboundedSender<Input>) -> Self {
        Self { inbox }
    }

    /// Ask the server for the group list.
    pub fn request_group_list(&self) -> Result<(), AppError> {
        self.submit(SessionEvent::RequestGroupList)
    }

    /// Ask to join `group`. Membership changes when the server echoes it.
    pub fn join(&self, group: impl Into<String>) -> Result<(), AppError> {
        self.submit(SessionEvent::RequestJoin { group: group.into() })
    }

    /// Ask to leave `group`.
    pub fn leave(&self, group: impl Into<String>) -> Result<(), AppError> {
        self.submit(SessionEvent::RequestLeave { group: group.into() })
    }

    /// Post a message to `group`.
    pub fn post(
        &self,
        group: impl Into<String>,
        subject: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), AppError> {
        self.submit(SessionEvent::RequestPost {
            group: group.into(),
            subject: subject.into(),
            content: content.into(),
        })
    }

    /// Select a message; its body is notified when available.
    pub fn select_message(&self, group: impl Into<String>, id: MessageId) -> Result<(), AppError> {
        self.submit(SessionEvent::SelectMessage { group: group.into(), id: Some(id) })
    }

    /// Clear the selection in `group`.
    pub fn clear_selection(&self, group: impl Into<String>) -> Result<(), AppError> {
        self.submit(SessionEvent::SelectMessage { group: group.into(), id: None })
    }

    /// Send a keepalive; the reply is notified as `Pong`.
    pub fn ping(&self) -> Result<(), AppError> {
        self.submit(SessionEvent::Ping)
    }

    /// Announce departure and close the connection.
    pub fn exit(&self) -> Result<(), AppError> {
        self.submit(SessionEvent::Exit)
    }

    /// Whether the runtime has stopped.
    pub fn is_closed(&self) -> bool {
        self.inbox.is_closed()
    }

    fn submit(&self, event: SessionEvent) -> Result<(), AppError> {
        self.inbox.send(Input::Intent(event)).map_err(|_| AppError::Closed)
    }
}

/// Stream of session changes. Ends after `Disconnected`.
#[derive(Debug)]
pub struct Notifications {
    rx: mpsc::UnboundedReceiver<Notification>,
}

impl Notifications {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<Notification>) -> Self {
        Self { rx }
    }

    /// Next notification. `None` once the runtime has stopped and the queue
    /// is drained.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    /// Next notification if one is already queued.
    pub fn try_recv(&mut self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }
}

/// A live client: intents in, notifications out.
#[derive(Debug)]
pub struct ConnectedClient {
    /// Submit intents.
    pub handle: ClientHandle,
    /// Receive notifications.
    pub notifications: Notifications,
    /// Runtime task; yields the final session state.
    pub runtime: JoinHandle<Session>,
}

/// Connect to the server and start the runtime.
///
/// # Errors
///
/// - `AppError::Session` if the user name or auto-join group cannot be sent
/// - `AppError::Transport` if the connection cannot be established
pub async fn connect(config: ClientConfig) -> Result<ConnectedClient, AppError> {
    let session = Session::new(config.session)?;
    let transport = Arc::new(Transport::new(config.transport));
    transport.connect(&config.host, config.port).await?;

    let (inbox, rx) = mpsc::unbounded_channel();
    let frames = inbox.clone();
    let disconnects = inbox.clone();
    transport
        .start_receiving(
            move |frame| {
                let _ = frames.send(Input::Frame(frame));
            },
            move |reason| {
                let _ = disconnects.send(Input::Disconnected(reason));
            },
        )
        .inspect_err(|_| transport.disconnect())?;

    let (runtime, notifications) = Runtime::new(session, transport, rx);
    let runtime = tokio::spawn(runtime.run());
    tracing::info!(host = %config.host, port = config.port, "client started");

    Ok(ConnectedClient { handle: ClientHandle::new(inbox), notifications, runtime })
}
