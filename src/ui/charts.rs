use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};

use crate::color::CategoryColors;
use crate::data::model::CategoryDim;
use crate::data::summary::Metrics;
use crate::state::AppState;

/// Single accent colour for plain bar charts; proportion charts colour by
/// category instead.
const ACCENT: Color32 = Color32::from_rgb(79, 138, 201);

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the metric cards and the chart grid in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a dataset to explore accidents  (File → Open…)");
            });
            return;
        }
    };

    let tables = &state.frame.tables;
    let colors_for = |dim: CategoryDim| -> CategoryColors {
        dataset
            .options
            .get(&dim)
            .map(|values| CategoryColors::new(values.iter().map(String::as_str)))
            .unwrap_or_default()
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            metric_cards(ui, &state.frame.metrics);
            ui.add_space(8.0);

            ui.columns(2, |cols: &mut [Ui]| {
                top_cities_table(&mut cols[0], &tables.top_cities);
                bar_chart(
                    &mut cols[1],
                    "by_state",
                    "Accidents per State",
                    &tables.by_state,
                );
            });
            ui.add_space(8.0);

            ui.columns(3, |cols: &mut [Ui]| {
                proportion_chart(
                    &mut cols[0],
                    "by_time_of_day",
                    "Accidents per Time of Day",
                    &tables.by_time_of_day,
                    &colors_for(CategoryDim::TimeOfDay),
                );
                bar_chart(
                    &mut cols[1],
                    "by_day_of_week",
                    "Accidents per Day of the Week",
                    &tables.by_day_of_week,
                );
                proportion_chart(
                    &mut cols[2],
                    "by_duration",
                    "Accident Duration Distribution",
                    &tables.by_duration,
                    &colors_for(CategoryDim::Duration),
                );
            });
            ui.add_space(8.0);

            ui.columns(3, |cols: &mut [Ui]| {
                bar_chart(
                    &mut cols[0],
                    "by_visibility",
                    "Accidents by Visibility",
                    &tables.by_visibility,
                );
                proportion_chart(
                    &mut cols[1],
                    "by_temperature",
                    "Accidents by Temperature",
                    &tables.by_temperature,
                    &colors_for(CategoryDim::Temperature),
                );
                rush_hour_chart(&mut cols[2], &tables.by_rush_hour);
            });
            ui.add_space(8.0);

            daily_line_chart(ui, &tables.daily_counts);
        });
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

fn metric_cards(ui: &mut Ui, metrics: &Metrics) {
    ui.columns(4, |cols: &mut [Ui]| {
        card(
            &mut cols[0],
            "Average Accidents per Day",
            format!("{:.2}", metrics.avg_per_day),
        );
        card(&mut cols[1], "Total Accidents", metrics.total.to_string());
        card(
            &mut cols[2],
            "Top State",
            metrics
                .top_state
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
        );
        card(
            &mut cols[3],
            "Peak Accident Hour",
            metrics
                .peak_hour
                .map(|h| h.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        );
    });
}

fn card(ui: &mut Ui, title: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(title);
            ui.heading(value);
        });
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Category bar chart with a single accent colour.
fn bar_chart(ui: &mut Ui, id: &str, title: &str, rows: &[(String, usize)]) {
    ui.group(|ui: &mut Ui| {
        ui.strong(title);
        let bars: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, (label, count))| {
                Bar::new(i as f64, *count as f64)
                    .width(0.7)
                    .fill(ACCENT)
                    .name(label)
            })
            .collect();
        let labels: Vec<String> = rows.iter().map(|r| r.0.clone()).collect();

        Plot::new(id)
            .height(220.0)
            .y_axis_label("Accidents")
            .x_axis_formatter(move |mark, _range| category_tick(&labels, mark.value))
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    });
}

/// Proportion chart: raw counts are converted to percentages at render time,
/// one colour per category.
fn proportion_chart(
    ui: &mut Ui,
    id: &str,
    title: &str,
    rows: &[(String, usize)],
    colors: &CategoryColors,
) {
    ui.group(|ui: &mut Ui| {
        ui.strong(title);
        // Every row carries at least one record, so a non-empty table always
        // has a positive total.
        let total: usize = rows.iter().map(|r| r.1).sum::<usize>().max(1);
        let bars: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, (label, count))| {
                let pct = 100.0 * *count as f64 / total as f64;
                Bar::new(i as f64, pct)
                    .width(0.7)
                    .fill(colors.color_for(label))
                    .name(format!("{label} ({pct:.1}%)"))
            })
            .collect();
        let labels: Vec<String> = rows.iter().map(|r| r.0.clone()).collect();

        Plot::new(id)
            .height(220.0)
            .y_axis_label("% of accidents")
            .x_axis_formatter(move |mark, _range| category_tick(&labels, mark.value))
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
    });
}

/// Rush-hour split, rendered like the other proportion charts.
fn rush_hour_chart(ui: &mut Ui, rows: &[(bool, usize)]) {
    let labeled: Vec<(String, usize)> = rows
        .iter()
        .map(|&(flag, count)| {
            let label = if flag { "Rush Hour" } else { "Off-Peak" };
            (label.to_string(), count)
        })
        .collect();
    let colors = CategoryColors::new(["Off-Peak", "Rush Hour"]);
    proportion_chart(ui, "by_rush_hour", "Is a Rush Hour?", &labeled, &colors);
}

/// Daily accident counts over time.
fn daily_line_chart(ui: &mut Ui, rows: &[(NaiveDate, usize)]) {
    ui.group(|ui: &mut Ui| {
        ui.strong("Daily Accident Counts Over Time");
        let points: PlotPoints = rows
            .iter()
            .map(|(date, count)| [f64::from(date.num_days_from_ce()), *count as f64])
            .collect();

        Plot::new("daily_counts")
            .height(260.0)
            .y_axis_label("Accidents")
            .x_axis_formatter(|mark, _range| {
                NaiveDate::from_num_days_from_ce_opt(mark.value as i32)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new(points).color(ACCENT).width(1.5));
            });
    });
}

/// Tick label for integer category positions; fractional grid marks stay
/// blank.
fn category_tick(labels: &[String], value: f64) -> String {
    let i = value.round();
    if (value - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Top cities table
// ---------------------------------------------------------------------------

fn top_cities_table(ui: &mut Ui, rows: &[(String, usize)]) {
    ui.group(|ui: &mut Ui| {
        ui.strong("Top Cities with Most Accidents");
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(28.0))
            .column(Column::remainder())
            .column(Column::auto().at_least(72.0))
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("#");
                });
                header.col(|ui: &mut Ui| {
                    ui.strong("City");
                });
                header.col(|ui: &mut Ui| {
                    ui.strong("Accidents");
                });
            })
            .body(|mut body| {
                for (i, (city, count)) in rows.iter().enumerate() {
                    body.row(18.0, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label((i + 1).to_string());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(city);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(count.to_string());
                        });
                    });
                }
            });
    });
}
