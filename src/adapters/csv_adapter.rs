//! CSV file adapter: candle input and annotated frame output.

use crate::domain::candle::{validate_candles, Candle};
use crate::domain::error::SignalError;
use crate::domain::frame::{CandleFrame, Column};
use crate::domain::strategy::Timeframe;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";
const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const BASE_HEADER: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

#[derive(Debug, Deserialize)]
struct CandleRecord {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Reads `{base_path}/{BASE_QUOTE}-{timeframe}.csv` and writes annotated frames.
pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// `BTC/USDC` at `1h` maps to `BTC_USDC-1h.csv`.
    pub fn csv_path(&self, pair: &str, timeframe: Timeframe) -> PathBuf {
        self.base_path
            .join(format!("{}-{}.csv", pair.replace('/', "_"), timeframe))
    }

    fn parse_candles<R: std::io::Read>(reader: R) -> Result<Vec<Candle>, SignalError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut candles = Vec::new();

        for (row, result) in rdr.deserialize::<CandleRecord>().enumerate() {
            let record = result.map_err(|e| SignalError::malformed(row, e.to_string()))?;
            let timestamp = parse_timestamp(&record.date).ok_or_else(|| {
                SignalError::malformed(row, format!("invalid date '{}'", record.date))
            })?;
            candles.push(Candle {
                timestamp,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            });
        }

        validate_candles(&candles)?;
        Ok(candles)
    }

    fn format_float(value: Option<f64>) -> String {
        value.map(|v| v.to_string()).unwrap_or_default()
    }
}

impl DataPort for CsvAdapter {
    fn fetch_candles(&self, pair: &str, timeframe: Timeframe) -> Result<Vec<Candle>, SignalError> {
        let path = self.csv_path(pair, timeframe);
        let file = fs::File::open(&path).map_err(|e| SignalError::DataSource {
            reason: format!("failed to open {}: {}", path.display(), e),
        })?;
        Self::parse_candles(file)
    }

    fn list_pairs(&self, timeframe: Timeframe) -> Result<Vec<String>, SignalError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SignalError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("-{}.csv", timeframe);
        let mut pairs = Vec::new();

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(stem) = name_str.strip_suffix(&suffix) {
                pairs.push(stem.replace('_', "/"));
            }
        }

        pairs.sort();
        Ok(pairs)
    }
}

impl ReportPort for CsvAdapter {
    /// Undefined values are written as empty cells, flags as `1`/`0`.
    fn write(&self, frame: &CandleFrame, output_path: &Path) -> Result<(), SignalError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(std::io::Error::from)?;

        let header: Vec<&str> = BASE_HEADER
            .iter()
            .copied()
            .chain(frame.column_names())
            .collect();
        wtr.write_record(&header).map_err(std::io::Error::from)?;

        for (t, candle) in frame.candles().iter().enumerate() {
            let mut record = vec![
                candle.timestamp.format(OUTPUT_DATE_FORMAT).to_string(),
                candle.open.to_string(),
                candle.high.to_string(),
                candle.low.to_string(),
                candle.close.to_string(),
                candle.volume.to_string(),
            ];
            for (_, column) in frame.columns() {
                record.push(match column {
                    Column::Float(values) => Self::format_float(values[t]),
                    Column::Flag(values) => String::from(if values[t] { "1" } else { "0" }),
                });
            }
            wtr.write_record(&record).map_err(std::io::Error::from)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-15 00:00:00,100.0,110.0,90.0,105.0,50000.5\n\
            2024-01-15 01:00:00,105.0,115.0,100.0,110.0,60000\n\
            2024-01-15 02:00:00,110.0,120.0,105.0,115.0,55000\n";

        fs::write(path.join("BTC_USDC-1h.csv"), csv_content).unwrap();
        fs::write(
            path.join("ETH_USDC-1h.csv"),
            "date,open,high,low,close,volume\n",
        )
        .unwrap();
        fs::write(
            path.join("ETH_USDC-4h.csv"),
            "date,open,high,low,close,volume\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_candles_returns_correct_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let candles = adapter.fetch_candles("BTC/USDC", Timeframe::Hour1).unwrap();

        assert_eq!(candles.len(), 3);
        assert_eq!(
            candles[1].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(1, 0, 0)
                .unwrap()
        );
        assert_eq!(candles[0].open, 100.0);
        assert_eq!(candles[0].high, 110.0);
        assert_eq!(candles[0].low, 90.0);
        assert_eq!(candles[0].close, 105.0);
        assert_eq!(candles[0].volume, 50000.5);
    }

    #[test]
    fn fetch_candles_missing_file_is_data_source_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch_candles("XRP/USDC", Timeframe::Hour1).unwrap_err();
        assert!(matches!(err, SignalError::DataSource { .. }));
    }

    #[test]
    fn accepts_all_date_formats() {
        let content = "date,open,high,low,close,volume\n\
            2024-01-01,1,1,1,1,1\n\
            2024-01-01T06:00:00,1,1,1,1,1\n\
            2024-01-01 12:00:00,1,1,1,1,1\n";
        let candles = CsvAdapter::parse_candles(content.as_bytes()).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[1].timestamp.format("%H").to_string(), "06");
    }

    #[test]
    fn bad_number_reports_row() {
        let content = "date,open,high,low,close,volume\n\
            2024-01-01,1,1,1,1,1\n\
            2024-01-02,1,1,1,oops,1\n";
        let err = CsvAdapter::parse_candles(content.as_bytes()).unwrap_err();
        assert!(matches!(err, SignalError::MalformedInput { row: 1, .. }));
    }

    #[test]
    fn bad_date_reports_row() {
        let content = "date,open,high,low,close,volume\n\
            01/02/2024,1,1,1,1,1\n";
        let err = CsvAdapter::parse_candles(content.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            SignalError::MalformedInput { row: 0, ref reason } if reason.contains("01/02/2024")
        ));
    }

    #[test]
    fn out_of_order_rows_rejected_not_sorted() {
        let content = "date,open,high,low,close,volume\n\
            2024-01-02,1,1,1,1,1\n\
            2024-01-01,1,1,1,1,1\n";
        let err = CsvAdapter::parse_candles(content.as_bytes()).unwrap_err();
        assert!(matches!(err, SignalError::MalformedInput { row: 1, .. }));
    }

    #[test]
    fn nan_close_rejected() {
        let content = "date,open,high,low,close,volume\n\
            2024-01-01,1,1,1,NaN,1\n";
        let err = CsvAdapter::parse_candles(content.as_bytes()).unwrap_err();
        assert!(matches!(err, SignalError::MalformedInput { row: 0, .. }));
    }

    #[test]
    fn list_pairs_filters_by_timeframe() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        assert_eq!(
            adapter.list_pairs(Timeframe::Hour1).unwrap(),
            vec!["BTC/USDC", "ETH/USDC"]
        );
        assert_eq!(adapter.list_pairs(Timeframe::Hour4).unwrap(), vec!["ETH/USDC"]);
        assert!(adapter.list_pairs(Timeframe::Day1).unwrap().is_empty());
    }

    #[test]
    fn write_emits_empty_cells_and_flags() {
        let (dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let candles = adapter.fetch_candles("BTC/USDC", Timeframe::Hour1).unwrap();

        let mut frame = CandleFrame::new(candles).unwrap();
        frame.set_float("rsi", vec![None, Some(55.5), Some(60.0)]).unwrap();
        frame.set_flag("enter_long", vec![false, true, false]).unwrap();

        let out = dir.path().join("out.csv");
        adapter.write(&frame, &out).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,open,high,low,close,volume,rsi,enter_long");
        assert_eq!(lines[1], "2024-01-15 00:00:00,100,110,90,105,50000.5,,0");
        assert_eq!(lines[2], "2024-01-15 01:00:00,105,115,100,110,60000,55.5,1");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn written_candles_read_back_unchanged() {
        let (dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let candles = adapter.fetch_candles("BTC/USDC", Timeframe::Hour1).unwrap();

        let out = dir.path().join("copy.csv");
        adapter
            .write(&CandleFrame::new(candles.clone()).unwrap(), &out)
            .unwrap();
        let reread = CsvAdapter::parse_candles(fs::File::open(&out).unwrap()).unwrap();
        assert_eq!(reread, candles);
    }
}
