use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, BooleanArray, Int32Array, Int64Array, StringArray, TimestampMicrosecondArray,
    TimestampMillisecondArray, TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;

use super::model::{AccidentDataset, AccidentRecord};

// ---------------------------------------------------------------------------
// Source column names
// ---------------------------------------------------------------------------

// Header names as they appear in the source table.
const COL_START_TIME: &str = "Start_Time";
const COL_END_TIME: &str = "End_Time";
const COL_STATE: &str = "State";
const COL_CITY: &str = "City";
const COL_DAY_OF_WEEK: &str = "Accident Day of Week";
const COL_TIME_OF_DAY: &str = "Time of Day";
const COL_DURATION: &str = "Duration_Bin";
const COL_TEMPERATURE: &str = "Temperature_Ranges";
const COL_PRECIPITATION: &str = "Precipitation_Ranges";
const COL_WIND_SPEED: &str = "Wind_Speed_Bin";
const COL_VISIBILITY: &str = "Visibility_Ranges";
const COL_HOUR: &str = "Accident_Hour";
const COL_OBSTACLES: &str = "Number_of_Traffic_Obstacles";
const COL_IS_WEEKEND: &str = "IsWeekend";
const COL_IS_RUSH_HOUR: &str = "IsRushHour";
const COL_IS_SEVERE: &str = "IsSevere";

/// Schema violations in a source file.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing column '{0}'")]
    MissingColumn(String),
    #[error("row {row}, column '{column}': cannot parse '{value}'")]
    BadValue {
        row: usize,
        column: String,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an accident dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – as written by `df.to_parquet()`
/// * `.json`    – records-oriented array, `df.to_json(orient='records')`
///                with ISO timestamp strings
/// * `.csv`     – header row with the source column names
pub fn load_file(path: &Path) -> Result<AccidentDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            parse_json(&text)
        }
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV file")?;
            parse_csv(file)
        }
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Field parsing helpers
// ---------------------------------------------------------------------------

/// Parse a timestamp in the formats the source data is known to use.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
}

/// Parse a boolean cell.  The source mixes pandas-style "True"/"False" with
/// lowercase and numeric spellings.
fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn bad_value(row: usize, column: &str, value: &str) -> SchemaError {
    SchemaError::BadValue {
        row,
        column: column.to_string(),
        value: value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Maps source column names to positions in the CSV header.
struct HeaderIndex {
    headers: Vec<String>,
}

impl HeaderIndex {
    fn new(headers: Vec<String>) -> Self {
        HeaderIndex { headers }
    }

    fn position(&self, column: &str) -> Result<usize, SchemaError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| SchemaError::MissingColumn(column.to_string()))
    }
}

/// Parse the accident table from CSV text.
pub fn parse_csv<R: Read>(reader: R) -> Result<AccidentDataset> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = HeaderIndex::new(
        reader
            .headers()
            .context("reading CSV headers")?
            .iter()
            .map(|h| h.to_string())
            .collect(),
    );

    let start_idx = headers.position(COL_START_TIME)?;
    let end_idx = headers.position(COL_END_TIME)?;
    let state_idx = headers.position(COL_STATE)?;
    let city_idx = headers.position(COL_CITY)?;
    let dow_idx = headers.position(COL_DAY_OF_WEEK)?;
    let tod_idx = headers.position(COL_TIME_OF_DAY)?;
    let duration_idx = headers.position(COL_DURATION)?;
    let temp_idx = headers.position(COL_TEMPERATURE)?;
    let precip_idx = headers.position(COL_PRECIPITATION)?;
    let wind_idx = headers.position(COL_WIND_SPEED)?;
    let vis_idx = headers.position(COL_VISIBILITY)?;
    let hour_idx = headers.position(COL_HOUR)?;
    let obstacles_idx = headers.position(COL_OBSTACLES)?;
    let weekend_idx = headers.position(COL_IS_WEEKEND)?;
    let rush_idx = headers.position(COL_IS_RUSH_HOUR)?;
    let severe_idx = headers.position(COL_IS_SEVERE)?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |idx: usize| row.get(idx).unwrap_or("");

        let start_raw = cell(start_idx);
        let start_time = parse_timestamp(start_raw)
            .ok_or_else(|| bad_value(row_no, COL_START_TIME, start_raw))?;
        let end_raw = cell(end_idx);
        let end_time =
            parse_timestamp(end_raw).ok_or_else(|| bad_value(row_no, COL_END_TIME, end_raw))?;

        let hour_raw = cell(hour_idx);
        let hour: u8 = hour_raw
            .trim()
            .parse()
            .map_err(|_| bad_value(row_no, COL_HOUR, hour_raw))?;
        let obstacles_raw = cell(obstacles_idx);
        let traffic_obstacles: u32 = obstacles_raw
            .trim()
            .parse()
            .map_err(|_| bad_value(row_no, COL_OBSTACLES, obstacles_raw))?;

        let flag = |idx: usize, column: &str| -> Result<bool, SchemaError> {
            let raw = cell(idx);
            parse_bool(raw).ok_or_else(|| bad_value(row_no, column, raw))
        };

        records.push(AccidentRecord {
            start_time,
            end_time,
            state: cell(state_idx).to_string(),
            city: cell(city_idx).to_string(),
            day_of_week: cell(dow_idx).to_string(),
            time_of_day: cell(tod_idx).to_string(),
            duration: cell(duration_idx).to_string(),
            temperature: cell(temp_idx).to_string(),
            precipitation: cell(precip_idx).to_string(),
            wind_speed: cell(wind_idx).to_string(),
            visibility: cell(vis_idx).to_string(),
            hour,
            traffic_obstacles,
            is_weekend: flag(weekend_idx, COL_IS_WEEKEND)?,
            is_rush_hour: flag(rush_idx, COL_IS_RUSH_HOUR)?,
            is_severe: flag(severe_idx, COL_IS_SEVERE)?,
        });
    }

    Ok(AccidentDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// One record as serialized by `df.to_json(orient='records')` with ISO
/// timestamp strings.
#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(rename = "Start_Time")]
    start_time: String,
    #[serde(rename = "End_Time")]
    end_time: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "Accident Day of Week")]
    day_of_week: String,
    #[serde(rename = "Time of Day")]
    time_of_day: String,
    #[serde(rename = "Duration_Bin")]
    duration: String,
    #[serde(rename = "Temperature_Ranges")]
    temperature: String,
    #[serde(rename = "Precipitation_Ranges")]
    precipitation: String,
    #[serde(rename = "Wind_Speed_Bin")]
    wind_speed: String,
    #[serde(rename = "Visibility_Ranges")]
    visibility: String,
    #[serde(rename = "Accident_Hour")]
    hour: u8,
    #[serde(rename = "Number_of_Traffic_Obstacles")]
    traffic_obstacles: u32,
    #[serde(rename = "IsWeekend")]
    is_weekend: bool,
    #[serde(rename = "IsRushHour")]
    is_rush_hour: bool,
    #[serde(rename = "IsSevere")]
    is_severe: bool,
}

/// Parse the accident table from a records-oriented JSON array.
pub fn parse_json(text: &str) -> Result<AccidentDataset> {
    let raw: Vec<JsonRecord> = serde_json::from_str(text).context("parsing JSON records")?;

    let mut records = Vec::with_capacity(raw.len());
    for (row_no, rec) in raw.into_iter().enumerate() {
        let start_time = parse_timestamp(&rec.start_time)
            .ok_or_else(|| bad_value(row_no, COL_START_TIME, &rec.start_time))?;
        let end_time = parse_timestamp(&rec.end_time)
            .ok_or_else(|| bad_value(row_no, COL_END_TIME, &rec.end_time))?;

        records.push(AccidentRecord {
            start_time,
            end_time,
            state: rec.state,
            city: rec.city,
            day_of_week: rec.day_of_week,
            time_of_day: rec.time_of_day,
            duration: rec.duration,
            temperature: rec.temperature,
            precipitation: rec.precipitation,
            wind_speed: rec.wind_speed,
            visibility: rec.visibility,
            hour: rec.hour,
            traffic_obstacles: rec.traffic_obstacles,
            is_weekend: rec.is_weekend,
            is_rush_hour: rec.is_rush_hour,
            is_severe: rec.is_severe,
        });
    }

    Ok(AccidentDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet accident table.
///
/// String columns may arrive as Utf8 or LargeUtf8, integers as Int32/Int64,
/// and timestamps either as native timestamp columns (any unit) or as ISO
/// strings; all combinations written by Pandas and Polars are accepted.
fn load_parquet(path: &Path) -> Result<AccidentDataset> {
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let start_col = column_by_name(&batch, COL_START_TIME)?;
        let end_col = column_by_name(&batch, COL_END_TIME)?;
        let state_col = column_by_name(&batch, COL_STATE)?;
        let city_col = column_by_name(&batch, COL_CITY)?;
        let dow_col = column_by_name(&batch, COL_DAY_OF_WEEK)?;
        let tod_col = column_by_name(&batch, COL_TIME_OF_DAY)?;
        let duration_col = column_by_name(&batch, COL_DURATION)?;
        let temp_col = column_by_name(&batch, COL_TEMPERATURE)?;
        let precip_col = column_by_name(&batch, COL_PRECIPITATION)?;
        let wind_col = column_by_name(&batch, COL_WIND_SPEED)?;
        let vis_col = column_by_name(&batch, COL_VISIBILITY)?;
        let hour_col = column_by_name(&batch, COL_HOUR)?;
        let obstacles_col = column_by_name(&batch, COL_OBSTACLES)?;
        let weekend_col = column_by_name(&batch, COL_IS_WEEKEND)?;
        let rush_col = column_by_name(&batch, COL_IS_RUSH_HOUR)?;
        let severe_col = column_by_name(&batch, COL_IS_SEVERE)?;

        for row in 0..batch.num_rows() {
            let string = |col: &Arc<dyn Array>, name: &str| -> Result<String> {
                string_at(col, row)
                    .ok_or_else(|| bad_value(row, name, &format!("{:?}", col.data_type())).into())
            };
            let timestamp = |col: &Arc<dyn Array>, name: &str| -> Result<NaiveDateTime> {
                timestamp_at(col, row)
                    .ok_or_else(|| bad_value(row, name, &format!("{:?}", col.data_type())).into())
            };
            let int = |col: &Arc<dyn Array>, name: &str| -> Result<i64> {
                int_at(col, row)
                    .ok_or_else(|| bad_value(row, name, &format!("{:?}", col.data_type())).into())
            };
            let flag = |col: &Arc<dyn Array>, name: &str| -> Result<bool> {
                bool_at(col, row)
                    .ok_or_else(|| bad_value(row, name, &format!("{:?}", col.data_type())).into())
            };

            let hour = int(hour_col, COL_HOUR)?;
            let hour = u8::try_from(hour).map_err(|_| bad_value(row, COL_HOUR, &hour.to_string()))?;
            let obstacles = int(obstacles_col, COL_OBSTACLES)?;
            let traffic_obstacles = u32::try_from(obstacles)
                .map_err(|_| bad_value(row, COL_OBSTACLES, &obstacles.to_string()))?;

            records.push(AccidentRecord {
                start_time: timestamp(start_col, COL_START_TIME)?,
                end_time: timestamp(end_col, COL_END_TIME)?,
                state: string(state_col, COL_STATE)?,
                city: string(city_col, COL_CITY)?,
                day_of_week: string(dow_col, COL_DAY_OF_WEEK)?,
                time_of_day: string(tod_col, COL_TIME_OF_DAY)?,
                duration: string(duration_col, COL_DURATION)?,
                temperature: string(temp_col, COL_TEMPERATURE)?,
                precipitation: string(precip_col, COL_PRECIPITATION)?,
                wind_speed: string(wind_col, COL_WIND_SPEED)?,
                visibility: string(vis_col, COL_VISIBILITY)?,
                hour,
                traffic_obstacles,
                is_weekend: flag(weekend_col, COL_IS_WEEKEND)?,
                is_rush_hour: flag(rush_col, COL_IS_RUSH_HOUR)?,
                is_severe: flag(severe_col, COL_IS_SEVERE)?,
            });
        }
    }

    Ok(AccidentDataset::from_records(records))
}

// -- Arrow column accessors --

fn column_by_name<'a>(
    batch: &'a arrow::record_batch::RecordBatch,
    name: &str,
) -> Result<&'a Arc<dyn Array>, SchemaError> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| SchemaError::MissingColumn(name.to_string()))?;
    Ok(batch.column(idx))
}

/// Extract a string cell from a Utf8 or LargeUtf8 column.
fn string_at(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|arr| arr.value(row).to_string()),
        DataType::LargeUtf8 => {
            use arrow::array::AsArray;
            Some(col.as_string::<i64>().value(row).to_string())
        }
        _ => None,
    }
}

/// Extract an integer cell from an Int32 or Int64 column.
fn int_at(col: &Arc<dyn Array>, row: usize) -> Option<i64> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|arr| i64::from(arr.value(row))),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|arr| arr.value(row)),
        _ => None,
    }
}

/// Extract a boolean cell.
fn bool_at(col: &Arc<dyn Array>, row: usize) -> Option<bool> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|arr| arr.value(row)),
        _ => None,
    }
}

/// Extract a timestamp cell from a native timestamp column (any unit) or an
/// ISO string column.
fn timestamp_at(col: &Arc<dyn Array>, row: usize) -> Option<NaiveDateTime> {
    if col.is_null(row) {
        return None;
    }
    let from_unix = |secs: i64, nanos: u32| {
        chrono::DateTime::from_timestamp(secs, nanos).map(|dt| dt.naive_utc())
    };
    match col.data_type() {
        DataType::Timestamp(TimeUnit::Second, _) => {
            let arr = col.as_any().downcast_ref::<TimestampSecondArray>()?;
            from_unix(arr.value(row), 0)
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            let arr = col.as_any().downcast_ref::<TimestampMillisecondArray>()?;
            let v = arr.value(row);
            from_unix(
                v.div_euclid(1_000),
                (v.rem_euclid(1_000) * 1_000_000) as u32,
            )
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let arr = col.as_any().downcast_ref::<TimestampMicrosecondArray>()?;
            let v = arr.value(row);
            from_unix(
                v.div_euclid(1_000_000),
                (v.rem_euclid(1_000_000) * 1_000) as u32,
            )
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            let arr = col.as_any().downcast_ref::<TimestampNanosecondArray>()?;
            let v = arr.value(row);
            from_unix(v.div_euclid(1_000_000_000), v.rem_euclid(1_000_000_000) as u32)
        }
        DataType::Utf8 | DataType::LargeUtf8 => parse_timestamp(&string_at(col, row)?),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CategoryDim;

    const CSV_HEADER: &str = "Start_Time,End_Time,State,City,Accident Day of Week,Time of Day,Duration_Bin,Temperature_Ranges,Precipitation_Ranges,Wind_Speed_Bin,Visibility_Ranges,Accident_Hour,Number_of_Traffic_Obstacles,IsWeekend,IsRushHour,IsSevere";

    fn sample_csv() -> String {
        format!(
            "{CSV_HEADER}\n\
             2023-03-01 08:15:00,2023-03-01 09:00:00,CA,Los Angeles,Wednesday,Morning,Short,Mild,None,Calm,High,8,2,False,True,False\n\
             2023-03-04 17:30:00,2023-03-04 18:10:00,TX,Houston,Saturday,Evening,Medium,Hot,Light,Breezy,Low,17,0,True,False,True\n"
        )
    }

    #[test]
    fn csv_rows_parse_into_typed_records() {
        let ds = parse_csv(sample_csv().as_bytes()).unwrap();
        assert_eq!(ds.len(), 2);

        let first = &ds.records[0];
        assert_eq!(first.state, "CA");
        assert_eq!(first.city, "Los Angeles");
        assert_eq!(first.hour, 8);
        assert_eq!(first.traffic_obstacles, 2);
        assert!(!first.is_weekend);
        assert!(first.is_rush_hour);
        assert_eq!(
            first.start_date(),
            chrono::NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()
        );

        let states: Vec<&str> = ds.options[&CategoryDim::State]
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(states, ["CA", "TX"]);
        assert_eq!(ds.obstacle_bounds, (0, 2));
    }

    #[test]
    fn csv_missing_column_is_reported_by_name() {
        let text = "Start_Time,State\n2023-03-01 08:15:00,CA\n";
        let err = parse_csv(text.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("End_Time"), "got: {err}");
    }

    #[test]
    fn csv_bad_cell_is_reported_with_row_and_column() {
        let text = format!(
            "{CSV_HEADER}\n\
             2023-03-01 08:15:00,2023-03-01 09:00:00,CA,Los Angeles,Wednesday,Morning,Short,Mild,None,Calm,High,not-an-hour,2,False,True,False\n"
        );
        let err = parse_csv(text.as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Accident_Hour"), "got: {msg}");
        assert!(msg.contains("not-an-hour"), "got: {msg}");
    }

    #[test]
    fn json_records_parse_into_typed_records() {
        let text = r#"[
            {
                "Start_Time": "2023-03-01T08:15:00",
                "End_Time": "2023-03-01T09:00:00",
                "State": "CA",
                "City": "Los Angeles",
                "Accident Day of Week": "Wednesday",
                "Time of Day": "Morning",
                "Duration_Bin": "Short",
                "Temperature_Ranges": "Mild",
                "Precipitation_Ranges": "None",
                "Wind_Speed_Bin": "Calm",
                "Visibility_Ranges": "High",
                "Accident_Hour": 8,
                "Number_of_Traffic_Obstacles": 2,
                "IsWeekend": false,
                "IsRushHour": true,
                "IsSevere": false
            }
        ]"#;
        let ds = parse_json(text).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].state, "CA");
        assert_eq!(ds.records[0].hour, 8);
    }

    #[test]
    fn timestamps_accept_known_source_formats() {
        for s in [
            "2023-03-01 08:15:00",
            "2023-03-01T08:15:00",
            "2023-03-01 08:15:00.123",
            "2023-03-01 08:15",
        ] {
            assert!(parse_timestamp(s).is_some(), "failed on {s}");
        }
        assert!(parse_timestamp("03/01/2023").is_none());
    }

    #[test]
    fn booleans_accept_pandas_and_lowercase_spellings() {
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("maybe"), None);
    }
}
