//! Async session driver.
//!
//! One tokio task per kiosk terminal owns the [`KioskSession`]. It selects
//! between incoming intents and the inactivity deadline, so the timer reset
//! and intent handlers never interleave. After every step the new
//! [`ViewModel`] is published on a `watch` channel for the renderer.
//!
//! Dropping every [`SessionHandle`] or calling [`SessionHandle::shutdown`]
//! ends the task; the pending timer goes with it.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::KioskError;
use crate::history::OrderReceipt;
use crate::intent::Intent;
use crate::session::{KioskSession, Outcome};
use crate::view::ViewModel;

/// Queued intents before senders wait.
const COMMAND_BUFFER: usize = 32;

/// Errors from talking to a session task.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The intent was rejected by the session.
    #[error(transparent)]
    Rejected(#[from] KioskError),

    /// The session task is no longer running.
    #[error("Session task has stopped")]
    Closed,

    /// The session task panicked or was aborted.
    #[error("Session task failed: {0}")]
    Join(#[from] JoinError),
}

#[derive(Debug)]
enum Command {
    Dispatch {
        intent: Intent,
        reply: oneshot::Sender<Result<Outcome, KioskError>>,
    },
    RecentOrders {
        reply: oneshot::Sender<Vec<OrderReceipt>>,
    },
    Shutdown,
}

/// Client side of a running session task.
#[derive(Debug)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    views: watch::Receiver<ViewModel>,
    task: JoinHandle<KioskSession>,
}

/// Start the session task on the current tokio runtime.
#[must_use]
pub fn spawn(session: KioskSession) -> SessionHandle {
    let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
    let (publisher, views) = watch::channel(session.view());
    let task = tokio::spawn(run(session, receiver, publisher));

    SessionHandle {
        commands,
        views,
        task,
    }
}

impl SessionHandle {
    /// Send an intent and wait for the session's verdict.
    ///
    /// # Errors
    ///
    /// `DriverError::Rejected` when the session refuses the intent (state is
    /// then unchanged or safely reset) and `DriverError::Closed` if the task
    /// has stopped.
    pub async fn dispatch(&self, intent: Intent) -> Result<Outcome, DriverError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Dispatch { intent, reply })
            .await
            .map_err(|_| DriverError::Closed)?;
        let outcome = response.await.map_err(|_| DriverError::Closed)?;
        Ok(outcome?)
    }

    /// Placed orders, newest first.
    ///
    /// # Errors
    ///
    /// `DriverError::Closed` if the task has stopped.
    pub async fn recent_orders(&self) -> Result<Vec<OrderReceipt>, DriverError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::RecentOrders { reply })
            .await
            .map_err(|_| DriverError::Closed)?;
        response.await.map_err(|_| DriverError::Closed)
    }

    /// Latest published view.
    #[must_use]
    pub fn current(&self) -> ViewModel {
        self.views.borrow().clone()
    }

    /// A receiver notified after every intent and every timer reset.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.views.clone()
    }

    /// Stop the task, cancel its timer and return the final session state.
    ///
    /// # Errors
    ///
    /// `DriverError::Join` if the task panicked.
    pub async fn shutdown(self) -> Result<KioskSession, DriverError> {
        // The task may already be gone; joining still reports how it ended.
        let _ = self.commands.send(Command::Shutdown).await;
        Ok(self.task.await?)
    }
}

async fn run(
    mut session: KioskSession,
    mut commands: mpsc::Receiver<Command>,
    publisher: watch::Sender<ViewModel>,
) -> KioskSession {
    debug!("Session task started");

    loop {
        let deadline = session.monitor().deadline();

        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Dispatch { intent, reply }) => {
                    let result = session.dispatch(intent, Instant::now());
                    // The caller may have given up waiting; the state change stands.
                    let _ = reply.send(result);
                }
                Some(Command::RecentOrders { reply }) => {
                    let _ = reply.send(session.history().recent().cloned().collect());
                    continue;
                }
                Some(Command::Shutdown) | None => break,
            },
            () = sleep_until(deadline) => {
                session.poll_inactivity(Instant::now());
            }
        }

        publisher.send_replace(session.view());
    }

    session.shutdown();
    info!(orders = session.history().len(), "Session task stopped");
    session
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
