use crate::error::{PlantCareError, Result};
use crate::logic::{format_plants, plants_needing};
use crate::models::{CareDate, CareKind, PlantRecord, PlantRegistry, PlantUpdate};
use crate::notify::{Notification, Notifier};
use crate::store::PlantStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Outcome of one due check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReport {
    pub kind: CareKind,
    pub today: NaiveDate,
    pub plants: Vec<String>,
    /// Whether the notifier accepted the summary.
    pub notified: bool,
}

impl DueReport {
    /// `{"needsWater": [...]}` or `{"needsFertilizer": [...]}`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert(
            self.kind.response_key().to_string(),
            serde_json::Value::from(self.plants.clone()),
        );
        serde_json::Value::Object(body)
    }
}

/// Read, update and check operations over the plant document.
///
/// Every call is a full load → compute → save cycle against the store.
/// Mutations are serialised so two updates cannot interleave their
/// read-modify-write.
pub struct PlantCareService {
    store: Arc<dyn PlantStore>,
    notifier: Arc<dyn Notifier>,
    write_lock: Mutex<()>,
}

impl PlantCareService {
    pub fn new(store: Arc<dyn PlantStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            write_lock: Mutex::new(()),
        }
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub async fn list(&self) -> Result<PlantRegistry> {
        self.load().await
    }

    pub async fn listing(&self, today: NaiveDate) -> Result<String> {
        let registry = self.load().await?;
        Ok(format_plants(&registry, today))
    }

    /// Start tracking a new plant. Existing names are rejected.
    pub async fn create(&self, name: &str, record: PlantRecord) -> Result<PlantRecord> {
        let name = require_name(Some(name))?;
        warn_unreadable_dates(&name, &record);

        let _guard = self.write_lock.lock().await;
        let mut registry = self.load().await?;
        if registry.contains(&name) {
            return Err(PlantCareError::AlreadyExists(format!("Plant '{}'", name)));
        }

        registry.insert(name.clone(), record.clone());
        self.save(registry).await?;

        tracing::info!(plant = %name, "Plant created");
        Ok(record)
    }

    /// Merge the supplied fields into an existing plant. Unknown names are
    /// rejected; use [`create`](Self::create) to add a plant.
    pub async fn update(&self, update: PlantUpdate) -> Result<(String, PlantRecord)> {
        let name = require_name(update.name.as_deref())?;

        let _guard = self.write_lock.lock().await;
        let mut registry = self.load().await?;
        let record = registry
            .get_mut(&name)
            .ok_or_else(|| PlantCareError::NotFound(format!("Plant '{}'", name)))?;

        record.apply(&update);
        let record = record.clone();
        warn_unreadable_dates(&name, &record);
        self.save(registry).await?;

        tracing::info!(plant = %name, "Plant updated");
        Ok((name, record))
    }

    /// Evaluate which plants need `kind` of care on `today` and notify the
    /// owner. A notifier failure is logged and does not change the report.
    pub async fn check(&self, kind: CareKind, today: NaiveDate) -> Result<DueReport> {
        let registry = self.load().await?;
        let plants = plants_needing(kind, &registry, today);

        tracing::info!(
            kind = %kind,
            %today,
            due = plants.len(),
            tracked = registry.len(),
            "Due check complete"
        );

        let notification = Notification::for_due_list(kind, &plants);
        let notified = match self.notifier.notify(&notification).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    notifier = self.notifier.name(),
                    "Failed to send notification: {}",
                    e
                );
                false
            }
        };

        Ok(DueReport {
            kind,
            today,
            plants,
            notified,
        })
    }

    /// Store I/O is blocking; run it off the async workers.
    async fn load(&self) -> Result<PlantRegistry> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.load()).await?
    }

    async fn save(&self, registry: PlantRegistry) -> Result<()> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.save(&registry)).await?
    }
}

fn require_name(name: Option<&str>) -> Result<String> {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => Ok(n.to_string()),
        _ => Err(PlantCareError::InvalidData("Plant name is required".into())),
    }
}

fn warn_unreadable_dates(name: &str, record: &PlantRecord) {
    for kind in CareKind::all() {
        if let CareDate::Unreadable(raw) = record.last_done(*kind) {
            tracing::warn!(
                plant = %name,
                kind = %kind,
                value = %raw,
                "Date is not YYYY-MM-DD; plant will be skipped by due checks"
            );
        }
    }
}
