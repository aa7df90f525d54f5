//! Single-threaded actor owning the session.
//!
//! The Runtime drains one inbox in order and, for each input:
//! 1. Feeds it to the [`Session`]
//! 2. Sends resulting commands through the [`Driver`]
//! 3. Queues resulting notifications on the notification channel
//!
//! Nothing else touches the session, so no two mutations interleave.

use std::ops::ControlFlow;

use pinboard_client::{Notification, Session, SessionAction, SessionEvent};
use tokio::sync::mpsc;

use crate::{Driver, Input, Notifications};

/// Actor that serializes every session mutation.
///
/// # Type Parameters
///
/// - `D`: outbound connection
pub struct Runtime<D: Driver> {
    session: Session,
    driver: D,
    inbox: mpsc::UnboundedReceiver<Input>,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime and the notification stream it feeds.
    pub fn new(
        session: Session,
        driver: D,
        inbox: mpsc::UnboundedReceiver<Input>,
    ) -> (Self, Notifications) {
        let (notifications, rx) = mpsc::unbounded_channel();
        (Self { session, driver, inbox, notifications }, Notifications::new(rx))
    }

    /// Run until the connection closes or every input source is gone.
    ///
    /// Returns the session so callers can inspect its final state.
    pub async fn run(mut self) -> Session {
        while let Some(input) = self.inbox.recv().await {
            if self.process(input).await.is_break() {
                break;
            }
        }

        self.driver.disconnect();
        tracing::debug!("runtime stopped");
        self.session
    }

    async fn process(&mut self, input: Input) -> ControlFlow<()> {
        match input {
            Input::Frame(frame) => {
                self.apply(SessionEvent::FrameReceived(frame)).await;
            },
            Input::Disconnected(reason) => {
                self.apply(SessionEvent::Disconnected { reason }).await;
                return ControlFlow::Break(());
            },
            Input::Intent(SessionEvent::Exit) => {
                self.apply(SessionEvent::Exit).await;
                // The read side answers with `Input::Disconnected`.
                self.driver.disconnect();
            },
            Input::Intent(event) => {
                self.apply(event).await;
            },
        }
        ControlFlow::Continue(())
    }

    async fn apply(&mut self, event: SessionEvent) {
        let actions = match self.session.handle(event) {
            Ok(actions) => actions,
            Err(reason) => {
                tracing::debug!(%reason, "intent rejected");
                vec![SessionAction::Notify(Notification::IntentRejected { reason })]
            },
        };

        for action in actions {
            match action {
                SessionAction::Send(command) => {
                    if let Err(e) = self.driver.send(&command).await {
                        // A failed write closes the connection; the read side
                        // reports it.
                        tracing::warn!(verb = %command.verb(), error = %e, "send failed");
                    }
                },
                SessionAction::Notify(notification) => {
                    // Nobody listening is fine.
                    let _ = self.notifications.send(notification);
                },
            }
        }
    }
}
