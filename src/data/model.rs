use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// AccidentRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single accident record (one row of the source table).
///
/// Continuous weather/duration variables arrive pre-binned as categorical
/// bucket labels; only the hour and the obstacle count are numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct AccidentRecord {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Two-letter state code.
    pub state: String,
    pub city: String,
    /// Weekday label, e.g. "Monday".
    pub day_of_week: String,
    /// Time-of-day bucket, e.g. "Morning".
    pub time_of_day: String,
    /// Accident-duration bucket.
    pub duration: String,
    /// Temperature bucket.
    pub temperature: String,
    /// Precipitation bucket.
    pub precipitation: String,
    /// Wind-speed bucket.
    pub wind_speed: String,
    /// Visibility bucket.
    pub visibility: String,
    /// Hour of day the accident started (0–23).
    pub hour: u8,
    /// Number of nearby traffic obstacles.
    pub traffic_obstacles: u32,
    pub is_weekend: bool,
    pub is_rush_hour: bool,
    pub is_severe: bool,
}

impl AccidentRecord {
    /// Calendar date of the accident start, used for daily grouping.
    pub fn start_date(&self) -> NaiveDate {
        self.start_time.date()
    }
}

// ---------------------------------------------------------------------------
// CategoryDim – the categorical filter dimensions
// ---------------------------------------------------------------------------

/// The categorical filter dimensions, in sidebar order.
///
/// Visibility is deliberately absent: it feeds a chart but has no filter
/// control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryDim {
    State,
    DayOfWeek,
    TimeOfDay,
    Duration,
    Temperature,
    Precipitation,
    WindSpeed,
}

impl CategoryDim {
    pub const ALL: [CategoryDim; 7] = [
        CategoryDim::State,
        CategoryDim::DayOfWeek,
        CategoryDim::TimeOfDay,
        CategoryDim::Duration,
        CategoryDim::Temperature,
        CategoryDim::Precipitation,
        CategoryDim::WindSpeed,
    ];

    /// Human-readable label for the sidebar control.
    pub fn label(self) -> &'static str {
        match self {
            CategoryDim::State => "State",
            CategoryDim::DayOfWeek => "Day of the Week",
            CategoryDim::TimeOfDay => "Time of Day",
            CategoryDim::Duration => "Accident Duration",
            CategoryDim::Temperature => "Temperature Range",
            CategoryDim::Precipitation => "Precipitation Range",
            CategoryDim::WindSpeed => "Wind Speed",
        }
    }

    /// The record field this dimension filters on.
    pub fn value(self, record: &AccidentRecord) -> &str {
        match self {
            CategoryDim::State => &record.state,
            CategoryDim::DayOfWeek => &record.day_of_week,
            CategoryDim::TimeOfDay => &record.time_of_day,
            CategoryDim::Duration => &record.duration,
            CategoryDim::Temperature => &record.temperature,
            CategoryDim::Precipitation => &record.precipitation,
            CategoryDim::WindSpeed => &record.wind_speed,
        }
    }
}

// ---------------------------------------------------------------------------
// FlagDim – the boolean filter dimensions
// ---------------------------------------------------------------------------

/// The yes/no filter dimensions, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlagDim {
    Weekend,
    RushHour,
    Severe,
}

impl FlagDim {
    pub const ALL: [FlagDim; 3] = [FlagDim::Weekend, FlagDim::RushHour, FlagDim::Severe];

    pub fn label(self) -> &'static str {
        match self {
            FlagDim::Weekend => "Is Weekend",
            FlagDim::RushHour => "Is Rush Hour",
            FlagDim::Severe => "Is Severe Accident",
        }
    }

    pub fn value(self, record: &AccidentRecord) -> bool {
        match self {
            FlagDim::Weekend => record.is_weekend,
            FlagDim::RushHour => record.is_rush_hour,
            FlagDim::Severe => record.is_severe,
        }
    }
}

// ---------------------------------------------------------------------------
// AccidentDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full loaded dataset with pre-computed filter-option indices.
///
/// Built once at load time and treated as immutable afterwards; every
/// interaction derives a fresh filtered view from it instead of filtering in
/// place, so filter state can never compound across interactions.
#[derive(Debug, Clone, Default)]
pub struct AccidentDataset {
    /// All records (rows), in file order.
    pub records: Vec<AccidentRecord>,
    /// Sorted unique values per categorical dimension, for the sidebar
    /// dropdowns.
    pub options: BTreeMap<CategoryDim, BTreeSet<String>>,
    /// Observed `[min, max]` of the obstacle count, bounds for the range
    /// control. `(0, 0)` when the dataset is empty.
    pub obstacle_bounds: (u32, u32),
}

impl AccidentDataset {
    /// Build the option indices from the loaded records.
    pub fn from_records(records: Vec<AccidentRecord>) -> Self {
        let mut options: BTreeMap<CategoryDim, BTreeSet<String>> = BTreeMap::new();
        let mut obstacle_bounds: Option<(u32, u32)> = None;

        for record in &records {
            for dim in CategoryDim::ALL {
                options
                    .entry(dim)
                    .or_default()
                    .insert(dim.value(record).to_string());
            }
            let n = record.traffic_obstacles;
            obstacle_bounds = Some(match obstacle_bounds {
                Some((lo, hi)) => (lo.min(n), hi.max(n)),
                None => (n, n),
            });
        }

        AccidentDataset {
            records,
            options,
            obstacle_bounds: obstacle_bounds.unwrap_or((0, 0)),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(state: &str, obstacles: u32) -> AccidentRecord {
        let start = NaiveDate::from_ymd_opt(2023, 3, 1)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        AccidentRecord {
            start_time: start,
            end_time: start + chrono::Duration::minutes(30),
            state: state.to_string(),
            city: "Springfield".to_string(),
            day_of_week: "Wednesday".to_string(),
            time_of_day: "Morning".to_string(),
            duration: "Short".to_string(),
            temperature: "Mild".to_string(),
            precipitation: "None".to_string(),
            wind_speed: "Calm".to_string(),
            visibility: "High".to_string(),
            hour: 8,
            traffic_obstacles: obstacles,
            is_weekend: false,
            is_rush_hour: true,
            is_severe: false,
        }
    }

    #[test]
    fn option_index_collects_sorted_unique_values() {
        let ds = AccidentDataset::from_records(vec![
            record("TX", 2),
            record("CA", 0),
            record("CA", 5),
        ]);
        let states: Vec<&str> = ds.options[&CategoryDim::State]
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(states, ["CA", "TX"]);
        assert_eq!(ds.obstacle_bounds, (0, 5));
    }

    #[test]
    fn empty_dataset_has_zeroed_bounds() {
        let ds = AccidentDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.obstacle_bounds, (0, 0));
        assert!(ds.options.is_empty());
    }

    #[test]
    fn start_date_truncates_to_calendar_day() {
        let r = record("CA", 1);
        assert_eq!(r.start_date(), NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
    }
}
