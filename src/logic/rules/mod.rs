pub mod fertilizer;
pub mod water;

pub use fertilizer::FertilizerRule;
pub use water::WaterRule;

use crate::models::{CareKind, PlantRecord};
use chrono::{Days, NaiveDate};

/// Decides whether one plant needs a given kind of care on a given day.
pub trait CareRule: Send + Sync {
    fn kind(&self) -> CareKind;

    /// Must not fail: a record that cannot be judged is simply not due.
    fn is_due(&self, record: &PlantRecord, today: NaiveDate) -> bool;
}

static WATER_RULE: WaterRule = WaterRule;
static FERTILIZER_RULE: FertilizerRule = FertilizerRule;

pub fn rule_for(kind: CareKind) -> &'static dyn CareRule {
    match kind {
        CareKind::Water => &WATER_RULE,
        CareKind::Fertilize => &FERTILIZER_RULE,
    }
}

/// First day on which care is due again, or `None` if the date overflows.
pub fn due_date(last: NaiveDate, every_days: u32) -> Option<NaiveDate> {
    last.checked_add_days(Days::new(u64::from(every_days)))
}

/// Inclusive: due on the day the interval elapses and every day after.
pub fn interval_elapsed(last: NaiveDate, every_days: u32, today: NaiveDate) -> bool {
    due_date(last, every_days).is_some_and(|due| today >= due)
}
