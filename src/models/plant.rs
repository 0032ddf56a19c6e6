use super::care::{CareDate, CareKind};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Care state for one plant, keyed by display name in a [`PlantRegistry`].
///
/// Dates stay as the owner typed them. An empty string reads as `None`;
/// anything else is kept verbatim, so a malformed date survives a
/// load/save cycle and is simply skipped by evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantRecord {
    #[serde(default, deserialize_with = "de_date", serialize_with = "ser_date")]
    pub last_watered: Option<String>,
    #[serde(default, deserialize_with = "de_date", serialize_with = "ser_date")]
    pub fertilized: Option<String>,
    #[serde(default, deserialize_with = "de_frequency")]
    pub water_freq: Option<u32>,
    #[serde(default, deserialize_with = "de_frequency")]
    pub fertilize_freq: Option<u32>,
}

impl PlantRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_water_freq(mut self, days: u32) -> Self {
        self.water_freq = positive(days);
        self
    }

    pub fn with_fertilize_freq(mut self, days: u32) -> Self {
        self.fertilize_freq = positive(days);
        self
    }

    pub fn with_last_watered(mut self, date: &str) -> Self {
        self.last_watered = non_empty(date);
        self
    }

    pub fn with_fertilized(mut self, date: &str) -> Self {
        self.fertilized = non_empty(date);
        self
    }

    pub fn last_done(&self, kind: CareKind) -> CareDate<'_> {
        match kind {
            CareKind::Water => CareDate::classify(self.last_watered.as_deref()),
            CareKind::Fertilize => CareDate::classify(self.fertilized.as_deref()),
        }
    }

    pub fn frequency(&self, kind: CareKind) -> Option<u32> {
        match kind {
            CareKind::Water => self.water_freq,
            CareKind::Fertilize => self.fertilize_freq,
        }
    }

    /// Merge the fields present in `update`; absent fields are left alone.
    pub fn apply(&mut self, update: &PlantUpdate) {
        if let Some(date) = &update.last_watered {
            self.last_watered = date.clone();
        }
        if let Some(date) = &update.fertilized {
            self.fertilized = date.clone();
        }
        if let Some(freq) = update.water_freq {
            self.water_freq = freq;
        }
        if let Some(freq) = update.fertilize_freq {
            self.fertilize_freq = freq;
        }
    }
}

/// Partial change to a plant. An empty or `null` date clears it; a `null`
/// frequency clears the schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_date_change")]
    pub last_watered: Option<Option<String>>,
    #[serde(default, deserialize_with = "de_date_change")]
    pub fertilized: Option<Option<String>>,
    #[serde(default, deserialize_with = "de_frequency_change")]
    pub water_freq: Option<Option<u32>>,
    #[serde(default, deserialize_with = "de_frequency_change")]
    pub fertilize_freq: Option<Option<u32>>,
}

impl PlantUpdate {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn watered_on(mut self, date: &str) -> Self {
        self.last_watered = Some(non_empty(date));
        self
    }

    pub fn fertilized_on(mut self, date: &str) -> Self {
        self.fertilized = Some(non_empty(date));
        self
    }

    pub fn water_every(mut self, days: Option<u32>) -> Self {
        self.water_freq = Some(days.and_then(positive));
        self
    }

    pub fn fertilize_every(mut self, days: Option<u32>) -> Self {
        self.fertilize_freq = Some(days.and_then(positive));
        self
    }

    /// The body of a create request, minus the name.
    pub fn into_record(self) -> PlantRecord {
        let mut record = PlantRecord::default();
        record.apply(&self);
        record
    }
}

/// Every plant the owner tracks, in document order.
///
/// Entries that are not a JSON object cannot be evaluated. They are set
/// aside on load and written back untouched on save, after the readable
/// plants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlantRegistry {
    plants: IndexMap<String, PlantRecord>,
    unreadable: IndexMap<String, Value>,
}

impl PlantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    /// True for readable plants and for entries set aside on load.
    pub fn contains(&self, name: &str) -> bool {
        self.plants.contains_key(name) || self.unreadable.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&PlantRecord> {
        self.plants.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PlantRecord> {
        self.plants.get_mut(name)
    }

    /// Insert or replace. A replaced plant keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, record: PlantRecord) -> Option<PlantRecord> {
        let name = name.into();
        self.unreadable.shift_remove(&name);
        self.plants.insert(name, record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlantRecord)> {
        self.plants.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plants.keys().map(String::as_str)
    }
}

impl FromIterator<(String, PlantRecord)> for PlantRegistry {
    fn from_iter<I: IntoIterator<Item = (String, PlantRecord)>>(iter: I) -> Self {
        Self {
            plants: iter.into_iter().collect(),
            unreadable: IndexMap::new(),
        }
    }
}

impl Serialize for PlantRegistry {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.plants.len() + self.unreadable.len()))?;
        for (name, record) in &self.plants {
            map.serialize_entry(name, record)?;
        }
        for (name, raw) in &self.unreadable {
            map.serialize_entry(name, raw)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PlantRegistry {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut registry = PlantRegistry::new();

        for (name, raw) in entries {
            let record = match &raw {
                Value::Object(_) => PlantRecord::deserialize(&raw).map_err(|e| e.to_string()),
                other => Err(format!("expected an object, found {}", other)),
            };
            match record {
                Ok(record) => {
                    registry.plants.insert(name, record);
                }
                Err(reason) => {
                    tracing::warn!(
                        plant = %name,
                        "Skipping unreadable plant record: {}",
                        reason
                    );
                    registry.unreadable.insert(name, raw);
                }
            }
        }

        Ok(registry)
    }
}

fn positive(days: u32) -> Option<u32> {
    (days > 0).then_some(days)
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn de_date<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => non_empty(&s),
        Some(other) => Some(other.to_string()),
    })
}

fn de_date_change<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    de_date(deserializer).map(Some)
}

fn ser_date<S>(value: &Option<String>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

fn de_frequency<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(frequency_from_value(Option::<Value>::deserialize(deserializer)?))
}

fn de_frequency_change<'de, D>(deserializer: D) -> std::result::Result<Option<Option<u32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(frequency_from_value(Option::<Value>::deserialize(
        deserializer,
    )?)))
}

/// Whole days from a JSON value. Integral floats truncate and numeric
/// strings parse; zero, negatives and anything else mean "no schedule".
fn frequency_from_value(value: Option<Value>) -> Option<u32> {
    let days = match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 1.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    days.and_then(|d| u32::try_from(d).ok()).and_then(positive)
}
