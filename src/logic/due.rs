//! Due-date evaluation over a whole [`PlantRegistry`].
//!
//! Everything here is pure: same registry and same `today` give the same
//! lists, in registry order. A record that cannot be judged is left out
//! rather than failing the batch.

use super::rules::{due_date, CareRule, FertilizerRule, WaterRule};
use crate::models::{CareDate, CareKind, PlantRecord, PlantRegistry};
use chrono::NaiveDate;

/// Names of plants `rule` considers due, evaluated lazily.
pub fn due_plants<'a>(
    rule: &'a dyn CareRule,
    registry: &'a PlantRegistry,
    today: NaiveDate,
) -> impl Iterator<Item = &'a str> + 'a {
    registry
        .iter()
        .filter(move |(_, record)| rule.is_due(record, today))
        .map(|(name, _)| name)
}

pub fn plants_needing(kind: CareKind, registry: &PlantRegistry, today: NaiveDate) -> Vec<String> {
    match kind {
        CareKind::Water => plants_needing_water(registry, today),
        CareKind::Fertilize => plants_needing_fertilizer(registry, today),
    }
}

pub fn plants_needing_water(registry: &PlantRegistry, today: NaiveDate) -> Vec<String> {
    collect_names(due_plants(&WaterRule, registry, today))
}

pub fn plants_needing_fertilizer(registry: &PlantRegistry, today: NaiveDate) -> Vec<String> {
    collect_names(due_plants(&FertilizerRule, registry, today))
}

fn collect_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    names.map(str::to_string).collect()
}

/// When the next round of care falls, as far as the record can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextCare {
    /// No schedule, no usable history, or the date is out of range.
    Unknown,
    /// Scheduled but never done; only fertilizing treats this as due.
    NeverDone,
    On(NaiveDate),
}

pub fn next_care(record: &PlantRecord, kind: CareKind) -> NextCare {
    let Some(every_days) = record.frequency(kind) else {
        return NextCare::Unknown;
    };

    match record.last_done(kind) {
        CareDate::On(last) => due_date(last, every_days).map_or(NextCare::Unknown, NextCare::On),
        CareDate::Never => NextCare::NeverDone,
        CareDate::Unreadable(_) => NextCare::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::rules::rule_for;
    use chrono::Days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn registry(entries: Vec<(&str, PlantRecord)>) -> PlantRegistry {
        entries
            .into_iter()
            .map(|(name, record)| (name.to_string(), record))
            .collect()
    }

    fn household() -> PlantRegistry {
        registry(vec![
            (
                "Monstera",
                PlantRecord::new()
                    .with_last_watered("2024-01-01")
                    .with_water_freq(7)
                    .with_fertilized("2024-01-01")
                    .with_fertilize_freq(30),
            ),
            (
                "Snake Plant",
                PlantRecord::new()
                    .with_last_watered("2023-12-01")
                    .with_water_freq(21),
            ),
            ("Pothos", PlantRecord::new().with_fertilize_freq(30)),
            (
                "Calathea",
                PlantRecord::new()
                    .with_last_watered("01/03/2024")
                    .with_water_freq(2)
                    .with_fertilized("soon")
                    .with_fertilize_freq(14),
            ),
            (
                "Aloe",
                PlantRecord::new()
                    .with_last_watered("2023-11-15")
                    .with_water_freq(14),
            ),
        ])
    }

    #[test]
    fn water_scenario_boundary() {
        let plants = registry(vec![(
            "Fern",
            PlantRecord::new()
                .with_last_watered("2024-01-01")
                .with_water_freq(7),
        )]);

        assert!(plants_needing_water(&plants, date(2024, 1, 7)).is_empty());
        assert_eq!(plants_needing_water(&plants, date(2024, 1, 8)), vec!["Fern"]);
    }

    #[test]
    fn due_every_day_after_interval() {
        let plants = registry(vec![(
            "Fern",
            PlantRecord::new()
                .with_last_watered("2024-01-01")
                .with_water_freq(7),
        )]);

        for offset in 7..60 {
            let today = date(2024, 1, 1) + Days::new(offset);
            assert_eq!(plants_needing_water(&plants, today), vec!["Fern"]);
        }
    }

    #[test]
    fn never_fertilized_is_due_any_day() {
        let plants = registry(vec![(
            "Pothos",
            serde_json::from_str(r#"{"fertilizeFreq": 30, "fertilized": ""}"#).unwrap(),
        )]);

        for today in [date(1999, 1, 1), date(2024, 6, 15), date(2099, 12, 31)] {
            assert_eq!(plants_needing_fertilizer(&plants, today), vec!["Pothos"]);
        }
    }

    #[test]
    fn watering_needs_history() {
        let plants = registry(vec![("Cactus", PlantRecord::new().with_water_freq(30))]);

        for today in [date(1999, 1, 1), date(2024, 6, 15), date(2099, 12, 31)] {
            assert!(plants_needing_water(&plants, today).is_empty());
        }
    }

    #[test]
    fn missing_frequency_never_due() {
        let plants = registry(vec![
            ("Old", PlantRecord::new().with_last_watered("1970-01-01")),
            ("Unfed", PlantRecord::new().with_fertilized("1970-01-01")),
            ("Blank", PlantRecord::new()),
        ]);

        let today = date(2099, 1, 1);
        assert!(plants_needing_water(&plants, today).is_empty());
        assert!(plants_needing_fertilizer(&plants, today).is_empty());
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let today = date(2024, 1, 20);
        let plants = household();

        let water = plants_needing_water(&plants, today);
        let fertilizer = plants_needing_fertilizer(&plants, today);

        assert!(!water.contains(&"Calathea".to_string()));
        assert!(!fertilizer.contains(&"Calathea".to_string()));
        assert_eq!(water, vec!["Monstera", "Snake Plant", "Aloe"]);
        assert_eq!(fertilizer, vec!["Pothos"]);
    }

    #[test]
    fn blank_or_padded_dates_are_skipped() {
        let plants: PlantRegistry = serde_json::from_str(
            r#"{
                "Pothos": {"fertilized": "   ", "fertilizeFreq": 30},
                "Fern": {"lastWatered": " 2024-01-01", "waterFreq": 7},
                "Ivy": {"fertilized": "", "fertilizeFreq": 30}
            }"#,
        )
        .unwrap();

        let today = date(2024, 1, 10);
        assert_eq!(plants_needing_fertilizer(&plants, today), vec!["Ivy"]);
        assert!(plants_needing_water(&plants, today).is_empty());
    }

    #[test]
    fn non_object_record_does_not_block_the_rest() {
        let plants: PlantRegistry = serde_json::from_str(
            r#"{"Broken": "oops", "Pothos": {"fertilizeFreq": 30}, "Gone": null}"#,
        )
        .unwrap();

        assert_eq!(
            plants_needing_fertilizer(&plants, date(2024, 1, 1)),
            vec!["Pothos"]
        );
    }

    #[test]
    fn results_follow_registry_order() {
        let plants = registry(vec![
            ("Zamioculcas", PlantRecord::new().with_fertilize_freq(10)),
            ("Begonia", PlantRecord::new().with_fertilize_freq(10)),
            ("Maranta", PlantRecord::new().with_fertilize_freq(10)),
        ]);

        assert_eq!(
            plants_needing_fertilizer(&plants, date(2024, 1, 1)),
            vec!["Zamioculcas", "Begonia", "Maranta"]
        );
    }

    #[test]
    fn evaluation_is_repeatable() {
        let plants = household();
        let today = date(2024, 1, 20);

        assert_eq!(
            plants_needing_water(&plants, today),
            plants_needing_water(&plants, today)
        );
        assert_eq!(
            plants_needing_fertilizer(&plants, today),
            plants_needing_fertilizer(&plants, today)
        );
    }

    #[test]
    fn empty_registry_has_nothing_due() {
        let plants = PlantRegistry::new();
        assert!(plants_needing_water(&plants, date(2024, 1, 1)).is_empty());
        assert!(plants_needing_fertilizer(&plants, date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn due_plants_is_lazy_over_rule() {
        let plants = household();
        let mut due = due_plants(rule_for(CareKind::Water), &plants, date(2024, 1, 20));
        assert_eq!(due.next(), Some("Monstera"));
        assert_eq!(due.next(), Some("Snake Plant"));
    }

    #[test]
    fn next_care_dates() {
        let plants = household();

        assert_eq!(
            next_care(plants.get("Monstera").unwrap(), CareKind::Water),
            NextCare::On(date(2024, 1, 8))
        );
        assert_eq!(
            next_care(plants.get("Monstera").unwrap(), CareKind::Fertilize),
            NextCare::On(date(2024, 1, 31))
        );
        assert_eq!(
            next_care(plants.get("Pothos").unwrap(), CareKind::Fertilize),
            NextCare::NeverDone
        );
        assert_eq!(
            next_care(plants.get("Pothos").unwrap(), CareKind::Water),
            NextCare::Unknown
        );
        assert_eq!(
            next_care(plants.get("Calathea").unwrap(), CareKind::Water),
            NextCare::Unknown
        );
    }
}
