use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::model::AccidentDataset;

// ---------------------------------------------------------------------------
// Metrics – the four headline scalars
// ---------------------------------------------------------------------------

/// The four headline metrics shown above the charts.
///
/// `top_state` and `peak_hour` are `None` for an empty view and render as
/// "N/A" in the UI.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metrics {
    /// Row count of the filtered view.
    pub total: usize,
    /// Rows divided by distinct calendar dates; 0 for an empty view.
    pub avg_per_day: f64,
    /// Most frequent state code.
    pub top_state: Option<String>,
    /// Most frequent hour of day.
    pub peak_hour: Option<u8>,
}

/// Compute the headline metrics for the given view (record indices into the
/// dataset). Pure; an empty view produces the zeroed/`None` defaults rather
/// than an error.
pub fn compute_metrics(dataset: &AccidentDataset, view: &[usize]) -> Metrics {
    if view.is_empty() {
        return Metrics::default();
    }

    let total = view.len();

    let distinct_dates: BTreeSet<NaiveDate> = view
        .iter()
        .map(|&i| dataset.records[i].start_date())
        .collect();
    let avg_per_day = total as f64 / distinct_dates.len() as f64;

    let top_state = mode(view.iter().map(|&i| dataset.records[i].state.as_str()))
        .map(str::to_string);
    let peak_hour = mode(view.iter().map(|&i| dataset.records[i].hour));

    Metrics {
        total,
        avg_per_day,
        top_state,
        peak_hour,
    }
}

/// Most frequent value in the iterator; ties resolve to the smallest value so
/// the result is deterministic regardless of row order.
fn mode<T: Ord>(values: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    // Ascending key iteration + strict comparison keeps the smallest key on a
    // tie.
    counts
        .into_iter()
        .fold(None, |best: Option<(T, usize)>, (value, n)| match best {
            Some((_, best_n)) if n <= best_n => best,
            _ => Some((value, n)),
        })
        .map(|(value, _)| value)
}
