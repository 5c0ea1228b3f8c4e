//! Output sink boundary.
//!
//! The pipeline hands a finished [`PipelineOutput`] to a [`Sink`]; the
//! CSV implementation commits all tables atomically by writing to
//! `.tmp` files and renaming only after every table wrote cleanly. A
//! failed run leaves no partial output behind.

use crate::pipeline::PipelineOutput;
use fuselab_core::correlate::Strength;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the sink layer.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error writing '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Receives the finished tables of a run.
pub trait Sink {
    fn write(&mut self, output: &PipelineOutput) -> Result<(), SinkError>;
}

/// Writes every output table as CSV under one directory.
pub struct CsvSink {
    out_dir: PathBuf,
}

/// The fixed output filenames, one per table.
pub const OUTPUT_TABLES: [&str; 8] = [
    "ticker_daily.csv",
    "index_daily.csv",
    "sector_daily.csv",
    "industry_daily.csv",
    "sector_summary.csv",
    "industry_summary.csv",
    "merged_time_series.csv",
    "correlation_statistics.csv",
];

impl CsvSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    fn commit(&self, staged: &[(PathBuf, PathBuf)]) -> Result<(), SinkError> {
        for (tmp, path) in staged {
            fs::rename(tmp, path).map_err(|source| {
                for (t, _) in staged {
                    let _ = fs::remove_file(t);
                }
                SinkError::Io {
                    path: path.clone(),
                    source,
                }
            })?;
        }
        Ok(())
    }
}

impl Sink for CsvSink {
    fn write(&mut self, output: &PipelineOutput) -> Result<(), SinkError> {
        fs::create_dir_all(&self.out_dir).map_err(|source| SinkError::Io {
            path: self.out_dir.clone(),
            source,
        })?;

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(OUTPUT_TABLES.len());
        let result = (|| {
            for name in OUTPUT_TABLES {
                let path = self.out_dir.join(name);
                let tmp = path.with_extension("csv.tmp");
                write_table(name, &tmp, output)?;
                staged.push((tmp, path));
            }
            Ok(())
        })();
        if let Err(e) = result {
            for (tmp, _) in &staged {
                let _ = fs::remove_file(tmp);
            }
            return Err(e);
        }

        self.commit(&staged)
    }
}

fn write_table(name: &str, tmp: &Path, output: &PipelineOutput) -> Result<(), SinkError> {
    let file = fs::File::create(tmp).map_err(|source| SinkError::Io {
        path: tmp.to_path_buf(),
        source,
    })?;
    let mut w = csv::Writer::from_writer(file);
    let result = match name {
        "ticker_daily.csv" => write_ticker_daily(&mut w, output),
        "index_daily.csv" => write_index_daily(&mut w, output),
        "sector_daily.csv" => write_aggregate(&mut w, &output.sector_daily, "sector"),
        "industry_daily.csv" => write_aggregate(&mut w, &output.industry_daily, "industry"),
        "sector_summary.csv" => write_summary(&mut w, &output.sector_summary, "sector"),
        "industry_summary.csv" => write_summary(&mut w, &output.industry_summary, "industry"),
        "merged_time_series.csv" => write_merged(&mut w, output),
        "correlation_statistics.csv" => write_correlations(&mut w, output),
        other => unreachable!("unknown output table {other}"),
    };
    result
        .and_then(|_| w.flush().map_err(csv::Error::from))
        .map_err(|source| SinkError::Csv {
            path: tmp.to_path_buf(),
            source,
        })
}

fn opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn write_ticker_daily<W: std::io::Write>(
    w: &mut csv::Writer<W>,
    output: &PipelineOutput,
) -> Result<(), csv::Error> {
    w.write_record([
        "trade_date",
        "ticker",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "daily_return",
        "volatility",
        "price_range",
        "price_change_pct",
    ])?;
    for r in &output.ticker_daily {
        w.write_record([
            r.trade_date.to_string(),
            r.ticker.clone(),
            opt(r.open),
            opt(r.high),
            opt(r.low),
            opt(r.close),
            opt(r.volume),
            opt(r.daily_return),
            opt(r.volatility),
            opt(r.price_range),
            opt(r.price_change_pct),
        ])?;
    }
    Ok(())
}

fn write_index_daily<W: std::io::Write>(
    w: &mut csv::Writer<W>,
    output: &PipelineOutput,
) -> Result<(), csv::Error> {
    w.write_record([
        "trade_date",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "daily_return",
        "volatility",
    ])?;
    for r in &output.index_daily {
        w.write_record([
            r.trade_date.to_string(),
            opt(r.open),
            opt(r.high),
            opt(r.low),
            opt(r.close),
            opt(r.volume),
            opt(r.daily_return),
            opt(r.volatility),
        ])?;
    }
    Ok(())
}

fn write_aggregate<W: std::io::Write>(
    w: &mut csv::Writer<W>,
    rows: &[fuselab_core::aggregate::AggregateRow],
    group_header: &str,
) -> Result<(), csv::Error> {
    w.write_record([
        "date",
        group_header,
        "avg_daily_return",
        "avg_volatility",
        "ticker_count",
    ])?;
    for r in rows {
        w.write_record([
            r.date.to_string(),
            r.group.clone(),
            r.mean_return.to_string(),
            opt(r.mean_volatility),
            r.ticker_count.to_string(),
        ])?;
    }
    Ok(())
}

fn write_summary<W: std::io::Write>(
    w: &mut csv::Writer<W>,
    rows: &[fuselab_core::aggregate::GroupSummary],
    group_header: &str,
) -> Result<(), csv::Error> {
    w.write_record([
        group_header,
        "mean_return",
        "std_return",
        "min_return",
        "max_return",
        "mean_close",
        "ticker_count",
    ])?;
    for r in rows {
        w.write_record([
            r.group.clone(),
            r.mean_return.to_string(),
            opt(r.std_return),
            r.min_return.to_string(),
            r.max_return.to_string(),
            opt(r.mean_close),
            r.ticker_count.to_string(),
        ])?;
    }
    Ok(())
}

fn write_merged<W: std::io::Write>(
    w: &mut csv::Writer<W>,
    output: &PipelineOutput,
) -> Result<(), csv::Error> {
    let table = &output.merged;
    let mut header = vec!["date".to_string()];
    header.extend(table.column_names().iter().cloned());
    w.write_record(&header)?;
    for (row, date) in table.dates().iter().enumerate() {
        let mut record = vec![date.to_string()];
        record.extend(table.row(row).into_iter().map(opt));
        w.write_record(&record)?;
    }
    Ok(())
}

fn write_correlations<W: std::io::Write>(
    w: &mut csv::Writer<W>,
    output: &PipelineOutput,
) -> Result<(), csv::Error> {
    w.write_record(["variable_a", "variable_b", "correlation", "strength"])?;
    for (i, j, r) in output.matrix.off_diagonal_pairs() {
        let strength = Strength::classify(r.abs())
            .map(|s| s.to_string())
            .unwrap_or_default();
        w.write_record([
            output.matrix.columns()[i].clone(),
            output.matrix.columns()[j].clone(),
            r.to_string(),
            strength,
        ])?;
    }
    Ok(())
}
