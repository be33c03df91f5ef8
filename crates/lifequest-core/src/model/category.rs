use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// How often a category is meant to be rated. Informational only; it decides
/// which categories a filtered session must cover, nothing more.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    Daily,
    Weekly,
    Occasional,
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cadence::Daily => write!(f, "daily"),
            Cadence::Weekly => write!(f, "weekly"),
            Cadence::Occasional => write!(f, "occasional"),
        }
    }
}

/// A trackable life category. `name` is the case-sensitive identity key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub cadence: Cadence,
}

impl Category {
    pub fn new(name: impl Into<String>, cadence: Cadence) -> Self {
        Self {
            name: name.into(),
            cadence,
        }
    }
}

/// Which cadences a session covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CadenceFilter {
    #[default]
    All,
    Only(BTreeSet<Cadence>),
}

impl CadenceFilter {
    pub fn only(cadence: Cadence) -> Self {
        CadenceFilter::Only(BTreeSet::from([cadence]))
    }

    pub fn matches(&self, cadence: Cadence) -> bool {
        match self {
            CadenceFilter::All => true,
            CadenceFilter::Only(set) => set.contains(&cadence),
        }
    }
}

impl FromIterator<Cadence> for CadenceFilter {
    fn from_iter<I: IntoIterator<Item = Cadence>>(iter: I) -> Self {
        CadenceFilter::Only(iter.into_iter().collect())
    }
}
