use super::{interval_elapsed, CareRule};
use crate::models::{CareDate, CareKind, PlantRecord};
use chrono::NaiveDate;

/// Watering schedule rule
///
/// Due once `waterFreq` days have passed since `lastWatered`.
/// A plant with no watering history is never flagged: the owner has to
/// record a first watering before reminders start.
pub struct WaterRule;

impl CareRule for WaterRule {
    fn kind(&self) -> CareKind {
        CareKind::Water
    }

    fn is_due(&self, record: &PlantRecord, today: NaiveDate) -> bool {
        let Some(every_days) = record.water_freq else {
            return false;
        };

        match record.last_done(CareKind::Water) {
            CareDate::On(last) => interval_elapsed(last, every_days, today),
            CareDate::Never | CareDate::Unreadable(_) => false,
        }
    }
}
