use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};
use tracing::info;

use crate::domain::{
    error::DomainError,
    services::notification_service::{ConfirmationJob, ConfirmationNotifier},
};

/// Hands confirmation jobs to a background worker through a bounded queue
#[derive(Clone)]
pub struct QueuedEmailNotifier {
    sender: mpsc::Sender<ConfirmationJob>,
}

impl QueuedEmailNotifier {
    /// Returns the notifier together with the receiving end of its queue
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ConfirmationJob>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Drain the queue until every notifier clone is dropped.
    /// Mail delivery itself belongs to an external service; the worker only records dispatch.
    pub fn spawn_worker(mut receiver: mpsc::Receiver<ConfirmationJob>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                info!(email = %job.email, conference = %job.conference_info, "confirmation email dispatched");
            }
        })
    }
}

impl ConfirmationNotifier for QueuedEmailNotifier {
    fn enqueue(&self, job: ConfirmationJob) -> Result<(), DomainError> {
        self.sender.try_send(job).map_err(|err| match err {
            TrySendError::Full(_) => DomainError::Notification("confirmation queue full".to_string()),
            TrySendError::Closed(_) => DomainError::Notification("confirmation queue closed".to_string()),
        })
    }
}
