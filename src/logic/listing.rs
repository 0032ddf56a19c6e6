use super::due::{next_care, NextCare};
use super::rules::rule_for;
use crate::models::{format_date, CareKind, PlantRecord, PlantRegistry};
use chrono::NaiveDate;

/// Human-readable listing of every plant, one block per plant.
pub fn format_plants(registry: &PlantRegistry, today: NaiveDate) -> String {
    if registry.is_empty() {
        return "No plants tracked yet.".to_string();
    }

    registry
        .iter()
        .map(|(name, record)| format_plant(name, record, today))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_plant(name: &str, record: &PlantRecord, today: NaiveDate) -> String {
    format!(
        "🪴 {name}\n  Last Watered: {}\n  Last Fertilized: {}\n  Water Every: {}\n  Fertilize Every: {}\n  Next Watering: {}\n  Next Fertilizing: {}\n",
        record.last_watered.as_deref().unwrap_or("Not yet"),
        record.fertilized.as_deref().unwrap_or("Not yet"),
        format_frequency(record.water_freq),
        format_frequency(record.fertilize_freq),
        format_next(record, CareKind::Water, today),
        format_next(record, CareKind::Fertilize, today),
    )
}

fn format_frequency(days: Option<u32>) -> String {
    match days {
        Some(1) => "1 day".to_string(),
        Some(d) => format!("{d} days"),
        None => "Not set".to_string(),
    }
}

fn format_next(record: &PlantRecord, kind: CareKind, today: NaiveDate) -> String {
    let due = rule_for(kind).is_due(record, today);
    match next_care(record, kind) {
        NextCare::On(date) if due => format!("{} (due)", format_date(date)),
        NextCare::On(date) => format_date(date),
        NextCare::NeverDone if due => "Now (never done)".to_string(),
        NextCare::NeverDone | NextCare::Unknown => "-".to_string(),
    }
}

/// Escape text for embedding in an HTML page.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
