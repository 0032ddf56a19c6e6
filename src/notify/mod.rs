pub mod log;
pub mod smtp;

pub use log::LogNotifier;
pub use smtp::SmtpNotifier;

use crate::error::Result;
use crate::models::CareKind;
use async_trait::async_trait;

/// A subject/body pair addressed to the configured owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Summary of one due check: the list of names, or a "none due" note.
    pub fn for_due_list(kind: CareKind, plants: &[String]) -> Self {
        let verb = kind.verb();
        if plants.is_empty() {
            Self::new(format!("No plants need {verb} today"), ":)")
        } else {
            Self::new(
                format!("Plants that need {verb} today"),
                format!(
                    "The following plants need {verb} today:\n\n{}",
                    plants.join("\n")
                ),
            )
        }
    }
}

/// Delivers notifications to a fixed, preconfigured recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    async fn notify(&self, notification: &Notification) -> Result<()>;

    async fn test_connection(&self) -> Result<bool> {
        Ok(true)
    }
}
