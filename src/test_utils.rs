//! In-memory collaborators for tests.

use crate::error::{PlantCareError, Result};
use crate::models::PlantRegistry;
use crate::notify::{Notification, Notifier};
use crate::store::PlantStore;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct MemoryStore {
    registry: Mutex<PlantRegistry>,
    saves: AtomicUsize,
    broken: bool,
}

impl MemoryStore {
    pub fn with(registry: PlantRegistry) -> Self {
        Self {
            registry: Mutex::new(registry),
            saves: AtomicUsize::new(0),
            broken: false,
        }
    }

    /// Every load and save fails with an IO error.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::with(PlantRegistry::new())
        }
    }

    pub fn snapshot(&self) -> PlantRegistry {
        self.registry.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.broken {
            return Err(PlantCareError::Io(std::io::Error::other("store offline")));
        }
        Ok(())
    }
}

impl PlantStore for MemoryStore {
    fn load(&self) -> Result<PlantRegistry> {
        self.check()?;
        Ok(self.snapshot())
    }

    fn save(&self, registry: &PlantRegistry) -> Result<()> {
        self.check()?;
        *self.registry.lock().unwrap() = registry.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Rejects every notification.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        if self.fail {
            return Err(PlantCareError::Notify("mail server unreachable".into()));
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
