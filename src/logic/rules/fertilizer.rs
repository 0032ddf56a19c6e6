use super::{interval_elapsed, CareRule};
use crate::models::{CareDate, CareKind, PlantRecord};
use chrono::NaiveDate;

/// Fertilizing schedule rule
///
/// Due once `fertilizeFreq` days have passed since `fertilized`.
/// Unlike watering, a scheduled plant that has never been fertilized is
/// overdue from the start.
///
/// Skip conditions:
/// - No `fertilizeFreq`
/// - `fertilized` present but not a `YYYY-MM-DD` date
pub struct FertilizerRule;

impl CareRule for FertilizerRule {
    fn kind(&self) -> CareKind {
        CareKind::Fertilize
    }

    fn is_due(&self, record: &PlantRecord, today: NaiveDate) -> bool {
        let Some(every_days) = record.fertilize_freq else {
            return false;
        };

        match record.last_done(CareKind::Fertilize) {
            CareDate::Never => true,
            CareDate::On(last) => interval_elapsed(last, every_days, today),
            CareDate::Unreadable(_) => false,
        }
    }
}
