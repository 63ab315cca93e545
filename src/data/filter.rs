use std::collections::BTreeMap;

use super::model::{AccidentDataset, AccidentRecord, CategoryDim, FlagDim};

// ---------------------------------------------------------------------------
// Predicate – one active filter constraint
// ---------------------------------------------------------------------------

/// A single active filter constraint, tagged by dimension kind so the engine
/// dispatches on an explicit variant instead of inferring value types.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Keep records whose categorical field equals the value.
    Category(CategoryDim, String),
    /// Keep records whose boolean field equals the value.
    Flag(FlagDim, bool),
    /// Keep records whose obstacle count lies within `lo..=hi`.
    ObstacleRange { lo: u32, hi: u32 },
}

impl Predicate {
    /// Whether a record passes this predicate.
    pub fn matches(&self, record: &AccidentRecord) -> bool {
        match self {
            Predicate::Category(dim, value) => dim.value(record) == value.as_str(),
            Predicate::Flag(dim, value) => dim.value(record) == *value,
            Predicate::ObstacleRange { lo, hi } => {
                (*lo..=*hi).contains(&record.traffic_obstacles)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSelection – snapshot of every sidebar control
// ---------------------------------------------------------------------------

/// Snapshot of the current control values.
///
/// A dimension absent from the maps (or a `None` obstacle range) means "All":
/// no constraint on that dimension. The default selection is fully
/// unrestricted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSelection {
    categories: BTreeMap<CategoryDim, String>,
    flags: BTreeMap<FlagDim, bool>,
    obstacles: Option<(u32, u32)>,
}

impl FilterSelection {
    /// Current value of a categorical control, `None` meaning "All".
    pub fn category(&self, dim: CategoryDim) -> Option<&str> {
        self.categories.get(&dim).map(String::as_str)
    }

    /// Set or clear a categorical control.
    pub fn set_category(&mut self, dim: CategoryDim, value: Option<String>) {
        match value {
            Some(v) => {
                self.categories.insert(dim, v);
            }
            None => {
                self.categories.remove(&dim);
            }
        }
    }

    /// Current value of a boolean control, `None` meaning "All".
    pub fn flag(&self, dim: FlagDim) -> Option<bool> {
        self.flags.get(&dim).copied()
    }

    /// Set or clear a boolean control.
    pub fn set_flag(&mut self, dim: FlagDim, value: Option<bool>) {
        match value {
            Some(v) => {
                self.flags.insert(dim, v);
            }
            None => {
                self.flags.remove(&dim);
            }
        }
    }

    /// Current obstacle-count interval, `None` meaning unrestricted.
    pub fn obstacles(&self) -> Option<(u32, u32)> {
        self.obstacles
    }

    /// Restrict the obstacle count to the inclusive interval `[lo, hi]`.
    pub fn set_obstacles(&mut self, range: Option<(u32, u32)>) {
        self.obstacles = range;
    }

    /// Drop every constraint, returning the selection to "All" everywhere.
    pub fn clear(&mut self) {
        self.categories.clear();
        self.flags.clear();
        self.obstacles = None;
    }

    /// The list of active predicates implied by the current control values.
    pub fn active_predicates(&self) -> Vec<Predicate> {
        let mut predicates: Vec<Predicate> = self
            .categories
            .iter()
            .map(|(&dim, value)| Predicate::Category(dim, value.clone()))
            .collect();
        predicates.extend(
            self.flags
                .iter()
                .map(|(&dim, &value)| Predicate::Flag(dim, value)),
        );
        if let Some((lo, hi)) = self.obstacles {
            predicates.push(Predicate::ObstacleRange { lo, hi });
        }
        predicates
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Return indices of records that pass all active predicates.
///
/// Predicates compose by logical AND, so the order they are checked in does
/// not matter. An empty predicate set keeps every record; a value matching
/// nothing yields an empty view, never an error.
pub fn filtered_indices(dataset: &AccidentDataset, selection: &FilterSelection) -> Vec<usize> {
    let predicates = selection.active_predicates();
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| predicates.iter().all(|p| p.matches(record)))
        .map(|(i, _)| i)
        .collect()
}
