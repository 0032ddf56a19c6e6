use super::{Notification, Notifier};
use crate::error::Result;
use async_trait::async_trait;

/// Fallback used when email is not configured: the message only reaches
/// the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            subject = %notification.subject,
            body = %notification.body,
            "Notification (email not configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_succeeds() {
        let notifier = LogNotifier;
        notifier
            .notify(&Notification::new("subject", "body"))
            .await
            .unwrap();
        assert!(notifier.test_connection().await.unwrap());
        assert_eq!(notifier.name(), "log");
    }
}
