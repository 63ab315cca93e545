use super::aggregate::{build_tables, AggregateTables};
use super::filter::{filtered_indices, FilterSelection};
use super::model::AccidentDataset;
use super::summary::{compute_metrics, Metrics};

// ---------------------------------------------------------------------------
// DashboardFrame – the output of one interaction
// ---------------------------------------------------------------------------

/// Everything the dashboard needs after one control change: the filtered
/// view, the headline metrics, and the chart tables.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardFrame {
    /// Indices of records passing the selection, in dataset order.
    pub view: Vec<usize>,
    pub metrics: Metrics,
    pub tables: AggregateTables,
}

/// Run the whole pipeline for one interaction: filter, summarize, aggregate.
///
/// Pure and synchronous; the same dataset and selection always produce the
/// same frame. The dataset is only read, so it can be shared across
/// concurrent callers behind an `Arc`.
pub fn compute(dataset: &AccidentDataset, selection: &FilterSelection) -> DashboardFrame {
    let view = filtered_indices(dataset, selection);
    let metrics = compute_metrics(dataset, &view);
    let tables = build_tables(dataset, &view);
    DashboardFrame {
        view,
        metrics,
        tables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{AccidentRecord, CategoryDim};
    use chrono::NaiveDate;

    fn record(state: &str, hour: u8) -> AccidentRecord {
        let start = NaiveDate::from_ymd_opt(2023, 3, 1)
            .unwrap()
            .and_hms_opt(u32::from(hour), 0, 0)
            .unwrap();
        AccidentRecord {
            start_time: start,
            end_time: start + chrono::Duration::hours(1),
            state: state.to_string(),
            city: "Springfield".to_string(),
            day_of_week: "Wednesday".to_string(),
            time_of_day: "Morning".to_string(),
            duration: "Short".to_string(),
            temperature: "Mild".to_string(),
            precipitation: "None".to_string(),
            wind_speed: "Calm".to_string(),
            visibility: "High".to_string(),
            hour,
            traffic_obstacles: 0,
            is_weekend: false,
            is_rush_hour: false,
            is_severe: false,
        }
    }

    /// Three-row dataset: {CA, 8}, {CA, 17}, {TX, 8}.
    fn dataset() -> AccidentDataset {
        AccidentDataset::from_records(vec![
            record("CA", 8),
            record("CA", 17),
            record("TX", 8),
        ])
    }

    #[test]
    fn unrestricted_selection_covers_the_whole_dataset() {
        let ds = dataset();
        let frame = compute(&ds, &FilterSelection::default());
        assert_eq!(frame.view.len(), ds.len());
        assert_eq!(frame.metrics.total, 3);
        assert_eq!(frame.metrics.top_state.as_deref(), Some("CA"));
        assert_eq!(frame.metrics.peak_hour, Some(8));
    }

    #[test]
    fn state_filter_narrows_every_output() {
        let ds = dataset();
        let mut selection = FilterSelection::default();
        selection.set_category(CategoryDim::State, Some("TX".to_string()));
        let frame = compute(&ds, &selection);
        assert_eq!(frame.metrics.total, 1);
        assert_eq!(frame.metrics.top_state.as_deref(), Some("TX"));
        assert_eq!(frame.metrics.peak_hour, Some(8));
        assert_eq!(frame.tables.by_state, vec![("TX".to_string(), 1)]);
    }

    #[test]
    fn total_always_equals_view_length() {
        let ds = dataset();
        for state in [None, Some("CA"), Some("TX"), Some("NY")] {
            let mut selection = FilterSelection::default();
            selection.set_category(CategoryDim::State, state.map(str::to_string));
            let frame = compute(&ds, &selection);
            assert_eq!(frame.metrics.total, frame.view.len());
        }
    }

    #[test]
    fn day_of_week_counts_sum_to_total() {
        let ds = dataset();
        let mut selection = FilterSelection::default();
        selection.set_category(CategoryDim::State, Some("CA".to_string()));
        let frame = compute(&ds, &selection);
        let sum: usize = frame.tables.by_day_of_week.iter().map(|r| r.1).sum();
        assert_eq!(sum, frame.metrics.total);
    }

    #[test]
    fn empty_view_degrades_everywhere() {
        let ds = dataset();
        let mut selection = FilterSelection::default();
        selection.set_category(CategoryDim::State, Some("NY".to_string()));
        let frame = compute(&ds, &selection);
        assert!(frame.view.is_empty());
        assert_eq!(frame.metrics.avg_per_day, 0.0);
        assert_eq!(frame.metrics.top_state, None);
        assert_eq!(frame.metrics.peak_hour, None);
        assert_eq!(frame.tables, Default::default());
    }

    #[test]
    fn recomputation_is_referentially_transparent() {
        let ds = dataset();
        let mut selection = FilterSelection::default();
        selection.set_category(CategoryDim::State, Some("CA".to_string()));
        assert_eq!(compute(&ds, &selection), compute(&ds, &selection));
    }
}
