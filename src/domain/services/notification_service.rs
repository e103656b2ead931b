use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationJob {
    pub email: String,
    pub conference_info: String,
}

/// Fire-and-forget hand-off of confirmation mails
pub trait ConfirmationNotifier: Send + Sync {
    fn enqueue(&self, job: ConfirmationJob) -> Result<(), DomainError>;
}
