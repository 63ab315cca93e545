use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::AccidentDataset;

// ---------------------------------------------------------------------------
// AggregateTables – chart-ready grouped counts
// ---------------------------------------------------------------------------

/// The grouped tables feeding the charts, one table per chart.
///
/// Every table holds raw counts; the proportion charts derive percentages at
/// render time. Tables without an explicit sort order below are emitted in
/// ascending key order, so output is deterministic for a given view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggregateTables {
    /// Top 10 cities by accident count, descending.
    pub top_cities: Vec<(String, usize)>,
    /// Accident count per state, every state present in the view.
    pub by_state: Vec<(String, usize)>,
    /// Accident count per time-of-day bucket (proportion chart).
    pub by_time_of_day: Vec<(String, usize)>,
    /// Accident count per day-of-week, descending by count.
    pub by_day_of_week: Vec<(String, usize)>,
    /// Accident count per duration bucket (proportion chart).
    pub by_duration: Vec<(String, usize)>,
    /// Daily accident counts, chronological, no gap filling.
    pub daily_counts: Vec<(NaiveDate, usize)>,
    /// Accident count per visibility bucket, descending by count.
    pub by_visibility: Vec<(String, usize)>,
    /// Accident count per temperature bucket (proportion chart).
    pub by_temperature: Vec<(String, usize)>,
    /// Accident count per rush-hour flag (proportion chart).
    pub by_rush_hour: Vec<(bool, usize)>,
}

/// Build every aggregate table from the given view (record indices into the
/// dataset). An empty view produces empty tables.
pub fn build_tables(dataset: &AccidentDataset, view: &[usize]) -> AggregateTables {
    let records = &dataset.records;

    let mut top_cities = sorted_by_count_desc(count_by(view, |i| records[i].city.clone()));
    top_cities.truncate(10);

    AggregateTables {
        top_cities,
        by_state: into_rows(count_by(view, |i| records[i].state.clone())),
        by_time_of_day: into_rows(count_by(view, |i| records[i].time_of_day.clone())),
        by_day_of_week: sorted_by_count_desc(count_by(view, |i| {
            records[i].day_of_week.clone()
        })),
        by_duration: into_rows(count_by(view, |i| records[i].duration.clone())),
        daily_counts: into_rows(count_by(view, |i| records[i].start_date())),
        by_visibility: sorted_by_count_desc(count_by(view, |i| {
            records[i].visibility.clone()
        })),
        by_temperature: into_rows(count_by(view, |i| records[i].temperature.clone())),
        by_rush_hour: into_rows(count_by(view, |i| records[i].is_rush_hour)),
    }
}

/// Group the view by a key and count group sizes.
fn count_by<K, F>(view: &[usize], key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(usize) -> K,
{
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for &i in view {
        *counts.entry(key(i)).or_default() += 1;
    }
    counts
}

/// Flatten a count map into rows, ascending key order.
fn into_rows<K: Ord>(counts: BTreeMap<K, usize>) -> Vec<(K, usize)> {
    counts.into_iter().collect()
}

/// Flatten a count map into rows sorted by descending count; equal counts
/// stay in ascending key order.
fn sorted_by_count_desc<K: Ord>(counts: BTreeMap<K, usize>) -> Vec<(K, usize)> {
    let mut rows: Vec<(K, usize)> = counts.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::AccidentRecord;
    use chrono::NaiveDate;

    fn record(city: &str, state: &str, day: u32, visibility: &str, rush: bool) -> AccidentRecord {
        let start = NaiveDate::from_ymd_opt(2023, 3, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        AccidentRecord {
            start_time: start,
            end_time: start + chrono::Duration::hours(1),
            state: state.to_string(),
            city: city.to_string(),
            day_of_week: "Wednesday".to_string(),
            time_of_day: "Morning".to_string(),
            duration: "Short".to_string(),
            temperature: "Mild".to_string(),
            precipitation: "None".to_string(),
            wind_speed: "Calm".to_string(),
            visibility: visibility.to_string(),
            hour: 9,
            traffic_obstacles: 0,
            is_weekend: false,
            is_rush_hour: rush,
            is_severe: false,
        }
    }

    fn full_view(ds: &AccidentDataset) -> Vec<usize> {
        (0..ds.len()).collect()
    }

    #[test]
    fn empty_view_produces_empty_tables() {
        let ds = AccidentDataset::from_records(vec![record("A", "CA", 1, "High", false)]);
        assert_eq!(build_tables(&ds, &[]), AggregateTables::default());
    }

    #[test]
    fn top_cities_are_capped_at_ten_and_sorted_desc() {
        let mut records = Vec::new();
        for c in 0..12u32 {
            // City "C00" appears 13 times, "C01" 12 times, ... "C11" once.
            for _ in 0..(13 - c) {
                records.push(record(&format!("C{c:02}"), "CA", 1, "High", false));
            }
        }
        let ds = AccidentDataset::from_records(records);
        let tables = build_tables(&ds, &full_view(&ds));

        assert_eq!(tables.top_cities.len(), 10);
        assert_eq!(tables.top_cities[0], ("C00".to_string(), 13));
        assert_eq!(tables.top_cities[9], ("C09".to_string(), 4));
        let counts: Vec<usize> = tables.top_cities.iter().map(|r| r.1).collect();
        assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn day_of_week_counts_sum_to_view_size() {
        let ds = AccidentDataset::from_records(vec![
            record("A", "CA", 1, "High", false),
            record("B", "CA", 2, "Low", true),
            record("C", "TX", 3, "High", false),
        ]);
        let view = full_view(&ds);
        let tables = build_tables(&ds, &view);
        let total: usize = tables.by_day_of_week.iter().map(|r| r.1).sum();
        assert_eq!(total, view.len());
    }

    #[test]
    fn daily_counts_are_chronological_without_gap_filling() {
        let ds = AccidentDataset::from_records(vec![
            record("A", "CA", 9, "High", false),
            record("B", "CA", 1, "High", false),
            record("C", "CA", 9, "High", false),
        ]);
        let tables = build_tables(&ds, &full_view(&ds));
        assert_eq!(
            tables.daily_counts,
            vec![
                (NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(), 1),
                (NaiveDate::from_ymd_opt(2023, 3, 9).unwrap(), 2),
            ]
        );
    }

    #[test]
    fn visibility_table_follows_the_filtered_view() {
        let ds = AccidentDataset::from_records(vec![
            record("A", "CA", 1, "High", false),
            record("B", "CA", 1, "Low", false),
            record("C", "TX", 1, "Low", false),
        ]);
        // Restrict the view to the CA rows only; the visibility table must
        // reflect the restriction.
        let tables = build_tables(&ds, &[0, 1]);
        assert_eq!(
            tables.by_visibility,
            vec![("High".to_string(), 1), ("Low".to_string(), 1)]
        );
    }

    #[test]
    fn rush_hour_table_counts_both_flags() {
        let ds = AccidentDataset::from_records(vec![
            record("A", "CA", 1, "High", true),
            record("B", "CA", 1, "High", false),
            record("C", "CA", 1, "High", true),
        ]);
        let tables = build_tables(&ds, &full_view(&ds));
        assert_eq!(tables.by_rush_hour, vec![(false, 1), (true, 2)]);
    }

    #[test]
    fn equal_counts_keep_ascending_key_order() {
        let ds = AccidentDataset::from_records(vec![
            record("B", "CA", 1, "High", false),
            record("A", "CA", 1, "High", false),
        ]);
        let tables = build_tables(&ds, &full_view(&ds));
        assert_eq!(
            tables.top_cities,
            vec![("A".to_string(), 1), ("B".to_string(), 1)]
        );
    }
}
