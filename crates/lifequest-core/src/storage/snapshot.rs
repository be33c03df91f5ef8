use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::model::{Cadence, Category, Goal, HistoryEntry, Planner, ProgressionState};
use crate::registry::CategoryRegistry;

/// Name of the stored record. Doubles as the schema version tag.
pub const SNAPSHOT_KEY: &str = "lifequest-data-v3";

/// Everything that is persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedSnapshot {
    pub progression: ProgressionState,
    pub categories: CategoryRegistry,
    /// Newest first.
    pub history: Vec<HistoryEntry>,
    pub goals: Planner,
}

impl Default for PersistedSnapshot {
    fn default() -> Self {
        Self {
            progression: ProgressionState::starter(),
            categories: CategoryRegistry::starter(),
            history: Vec::new(),
            goals: Planner::starter(),
        }
    }
}

/// A loaded snapshot plus the fields that had to fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Restored {
    pub snapshot: PersistedSnapshot,
    /// Fields that were present but unreadable (absent fields are not listed).
    pub defaulted: Vec<String>,
}

impl Restored {
    /// The unreadable fields as an error value, for surfacing to the user.
    pub fn malformed(&self) -> Option<CoreError> {
        if self.defaulted.is_empty() {
            None
        } else {
            Some(CoreError::MalformedSnapshot(format!(
                "reset to defaults: {}",
                self.defaulted.join(", ")
            )))
        }
    }
}

impl PersistedSnapshot {
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a stored record, filling every missing or unreadable field with
    /// its default. Never fails: `None` (first run), garbage, and records
    /// written by older versions all produce a usable snapshot.
    ///
    /// Besides the current shape this accepts the flat layout of earlier
    /// versions (`xp`, `totalXp`, `level`, `streak`, `logs`, plain-string
    /// categories).
    pub fn restore(raw: Option<&str>) -> Restored {
        let mut defaulted = Vec::new();

        let root = match raw.map(|text| serde_json::from_str::<Value>(text)) {
            None => Map::new(),
            Some(Ok(Value::Object(map))) => map,
            Some(Ok(other)) => {
                tracing::warn!("Stored snapshot is not an object ({other}), using defaults");
                defaulted.push("snapshot".to_string());
                Map::new()
            }
            Some(Err(e)) => {
                tracing::warn!("Stored snapshot is not valid JSON ({e}), using defaults");
                defaulted.push("snapshot".to_string());
                Map::new()
            }
        };

        let progression = restore_progression(&root, &mut defaulted);
        let categories = restore_categories(&root, &mut defaulted);
        let history = restore_list(
            &root,
            &["history", "logs"],
            "history",
            HistoryEntry::validate,
            &mut defaulted,
        )
        .unwrap_or_default();
        let goals = restore_list::<Goal>(&root, &["goals"], "goals", accept, &mut defaulted)
            .map(Planner::from_goals)
            .unwrap_or_else(Planner::starter);

        Restored {
            snapshot: PersistedSnapshot {
                progression,
                categories,
                history,
                goals,
            },
            defaulted,
        }
    }
}

/// Look up a field in `primary` by its current name, then in `fallback` by
/// its legacy name.
fn lookup<'a>(
    primary: Option<&'a Map<String, Value>>,
    fallback: &'a Map<String, Value>,
    name: &str,
    legacy_name: &str,
) -> Option<&'a Value> {
    primary
        .and_then(|p| p.get(name))
        .or_else(|| fallback.get(legacy_name))
}

fn read_field<T: DeserializeOwned>(
    value: Option<&Value>,
    field: &str,
    default: T,
    defaulted: &mut Vec<String>,
) -> T {
    match value {
        None | Some(Value::Null) => default,
        Some(v) => match T::deserialize(v) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Unreadable {field} ({e}), using default");
                defaulted.push(field.to_string());
                default
            }
        },
    }
}

fn restore_progression(
    root: &Map<String, Value>,
    defaulted: &mut Vec<String>,
) -> ProgressionState {
    let starter = ProgressionState::starter();
    let nested = match root.get("progression") {
        Some(Value::Object(map)) => Some(map),
        Some(Value::Null) | None => None,
        Some(_) => {
            tracing::warn!("Unreadable progression, using defaults");
            defaulted.push("progression".to_string());
            None
        }
    };

    let mut level = read_field(
        lookup(nested, root, "level", "level"),
        "progression.level",
        starter.level,
        defaulted,
    );
    if level == 0 {
        tracing::warn!("Stored level 0 is invalid, using default");
        defaulted.push("progression.level".to_string());
        level = starter.level;
    }

    let mut progression = ProgressionState {
        level,
        current_xp: read_field(
            lookup(nested, root, "current_xp", "xp"),
            "progression.current_xp",
            starter.current_xp,
            defaulted,
        ),
        lifetime_xp: read_field(
            lookup(nested, root, "lifetime_xp", "totalXp"),
            "progression.lifetime_xp",
            starter.lifetime_xp,
            defaulted,
        ),
        streak: read_field(
            lookup(nested, root, "streak", "streak"),
            "progression.streak",
            starter.streak,
            defaulted,
        ),
    };
    progression.normalize();
    progression
}

/// A stored category: the current record shape or an older bare name.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCategory {
    Record(Category),
    Name(String),
}

fn restore_categories(
    root: &Map<String, Value>,
    defaulted: &mut Vec<String>,
) -> CategoryRegistry {
    let Some(stored) =
        restore_list::<StoredCategory>(root, &["categories"], "categories", accept, defaulted)
    else {
        return CategoryRegistry::starter();
    };
    let categories = stored
        .into_iter()
        .map(|c| match c {
            StoredCategory::Record(category) => category,
            StoredCategory::Name(name) => Category::new(name, Cadence::Daily),
        })
        .collect();
    CategoryRegistry::from_categories(categories)
}

fn accept<T>(_: &T) -> Result<(), CoreError> {
    Ok(())
}

/// Read an array field, keeping the elements that parse and pass `check`.
/// `None` when the field is absent or not an array.
fn restore_list<T: DeserializeOwned>(
    root: &Map<String, Value>,
    keys: &[&str],
    field: &str,
    check: fn(&T) -> Result<(), CoreError>,
    defaulted: &mut Vec<String>,
) -> Option<Vec<T>> {
    let value = keys.iter().find_map(|k| root.get(*k))?;
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return None,
        _ => {
            tracing::warn!("Unreadable {field} (not a list), using default");
            defaulted.push(field.to_string());
            return None;
        }
    };

    let mut parsed = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let result = T::deserialize(item)
            .map_err(|e| e.to_string())
            .and_then(|v| check(&v).map(|()| v).map_err(|e| e.to_string()));
        match result {
            Ok(v) => parsed.push(v),
            Err(e) => {
                tracing::warn!("Skipping unreadable {field}[{idx}]: {e}");
                defaulted.push(format!("{field}[{idx}]"));
            }
        }
    }
    Some(parsed)
}
