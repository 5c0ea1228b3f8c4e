//! Source CSV loading for the runner.
//!
//! Resolves the five fixed source filenames under an input directory,
//! reads them with polars, and validates each table's structural
//! contract before anything downstream touches it. A missing file or a
//! missing required column fails here with the offending path or column
//! named.

use fuselab_core::error::SchemaError;
use fuselab_core::schema;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the source loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source file for '{source_name}' not found at {path}")]
    MissingFile { source_name: String, path: PathBuf },

    #[error("cannot read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// The five source files of one input directory.
#[derive(Debug, Clone)]
pub struct SourcePaths {
    pub stock: PathBuf,
    pub index: PathBuf,
    pub weather: PathBuf,
    pub sentiment_daily: PathBuf,
    pub sentiment_weekly: PathBuf,
}

impl SourcePaths {
    /// Resolve the fixed source filenames under `dir`.
    pub fn from_dir(dir: &Path) -> Self {
        Self {
            stock: dir.join("stock_daily.csv"),
            index: dir.join("index_daily.csv"),
            weather: dir.join("weather_daily.csv"),
            sentiment_daily: dir.join("sentiment_daily.csv"),
            sentiment_weekly: dir.join("sentiment_weekly.csv"),
        }
    }
}

/// The five source tables, materialized and schema-checked.
#[derive(Debug)]
pub struct LoadedSources {
    pub stock: DataFrame,
    pub index: DataFrame,
    pub weather: DataFrame,
    pub sentiment_daily: DataFrame,
    pub sentiment_weekly: DataFrame,
}

/// Load and validate all five sources.
pub fn load_sources(paths: &SourcePaths) -> Result<LoadedSources, LoadError> {
    let stock = read_csv(&paths.stock, schema::STOCK.source)?;
    let index = read_csv(&paths.index, schema::MARKET_INDEX.source)?;
    let weather = read_csv(&paths.weather, schema::WEATHER.source)?;
    let sentiment_daily = read_csv(&paths.sentiment_daily, schema::SENTIMENT_DAILY.source)?;
    let sentiment_weekly = read_csv(&paths.sentiment_weekly, schema::SENTIMENT_WEEKLY.source)?;

    schema::STOCK.validate(&stock)?;
    schema::MARKET_INDEX.validate(&index)?;
    schema::WEATHER.validate(&weather)?;
    schema::SENTIMENT_DAILY.validate(&sentiment_daily)?;
    schema::SENTIMENT_WEEKLY.validate(&sentiment_weekly)?;

    Ok(LoadedSources {
        stock,
        index,
        weather,
        sentiment_daily,
        sentiment_weekly,
    })
}

fn read_csv(path: &Path, source_name: &str) -> Result<DataFrame, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingFile {
            source_name: source_name.to_string(),
            path: path.to_path_buf(),
        });
    }
    LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    fn write_minimal_sources(dir: &Path) {
        write_file(
            dir,
            "stock_daily.csv",
            "date,ticker,open,high,low,close,volume\n2018-01-02,AAPL,100,103,99,102,1000\n",
        );
        write_file(
            dir,
            "index_daily.csv",
            "trade_date,open,high,low,close,volume\n2018-01-02,2695,2714,2682,2713,3000000\n",
        );
        write_file(dir, "weather_daily.csv", "obs_date,alabama\n2018-01-02,0.4\n");
        write_file(
            dir,
            "sentiment_daily.csv",
            "news_date,depression_word_count,total_articles\n2018-01-02,12,4\n",
        );
        write_file(
            dir,
            "sentiment_weekly.csv",
            "week_end_date,depression_index\n2018-01-07,5.0\n",
        );
    }

    #[test]
    fn loads_a_complete_input_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_sources(dir.path());
        let loaded = load_sources(&SourcePaths::from_dir(dir.path())).unwrap();
        assert_eq!(loaded.stock.height(), 1);
        assert_eq!(loaded.weather.height(), 1);
    }

    #[test]
    fn missing_file_names_the_source() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_sources(dir.path());
        std::fs::remove_file(dir.path().join("weather_daily.csv")).unwrap();
        let err = load_sources(&SourcePaths::from_dir(dir.path())).unwrap_err();
        match err {
            LoadError::MissingFile { source_name, .. } => assert_eq!(source_name, "weather"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn schema_violation_surfaces_from_the_loader() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_sources(dir.path());
        write_file(
            dir.path(),
            "sentiment_weekly.csv",
            "week_end_date,wrong_column\n2018-01-07,5.0\n",
        );
        let err = load_sources(&SourcePaths::from_dir(dir.path())).unwrap_err();
        assert!(matches!(err, LoadError::Schema(SchemaError::MissingColumn { .. })));
    }
}
