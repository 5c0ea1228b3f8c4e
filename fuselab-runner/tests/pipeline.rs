//! End-to-end pipeline test over fixture CSVs.
//!
//! Exercises the full Load → Normalize → Align → Derive → Aggregate →
//! Correlate → Sink path against small handwritten inputs with known
//! answers, plus the synthetic-source path.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use fuselab_runner::loader::SourcePaths;
use fuselab_runner::pipeline::{execute, Stage};
use fuselab_runner::sink::OUTPUT_TABLES;
use fuselab_runner::synthetic::write_synthetic_sources;
use fuselab_runner::{CsvSink, PipelineConfig, SilentProgress};
use std::io::Write;
use std::path::Path;

fn write_file(dir: &Path, name: &str, content: &str) {
    let mut f = std::fs::File::create(dir.join(name)).unwrap();
    f.write_all(content.as_bytes()).unwrap();
}

/// Three trading days, two Technology tickers, one weekly observation.
fn write_fixture(dir: &Path) {
    write_file(
        dir,
        "stock_daily.csv",
        "date,ticker,open,high,low,close,volume,company_name,sector,industry\n\
         2018-01-08,AAPL,100,101,99,100,1000,Apple Inc.,Technology,Hardware\n\
         2018-01-09,AAPL,100,103,99,102,1100,Apple Inc.,Technology,Hardware\n\
         2018-01-10,AAPL,102,103,100,101,1200,Apple Inc.,Technology,Hardware\n\
         2018-01-08,MSFT,50,51,49,50,2000,Microsoft,Technology,Software\n\
         2018-01-09,MSFT,50,53,49,52,2100,Microsoft,Technology,Software\n\
         2018-01-10,MSFT,52,53,51,52,2200,Microsoft,Technology,Software\n",
    );
    write_file(
        dir,
        "index_daily.csv",
        "trade_date,open,high,low,close,volume\n\
         2018-01-08,2700,2710,2690,2700,3000000\n\
         2018-01-09,2700,2730,2700,2727,3100000\n\
         2018-01-10,2727,2730,2690,2700,3200000\n",
    );
    write_file(
        dir,
        "weather_daily.csv",
        "obs_date,alabama,alaska\n\
         2018-01-08,0.4,1.2\n\
         2018-01-09,0.0,0.8\n\
         2018-01-10,0.6,0.0\n",
    );
    write_file(
        dir,
        "sentiment_daily.csv",
        "news_date,depression_word_count,total_articles\n\
         2018-01-08,12,4\n\
         2018-01-09,8,2\n\
         2018-01-10,0,0\n",
    );
    write_file(
        dir,
        "sentiment_weekly.csv",
        "week_end_date,depression_index\n2018-01-07,5.0\n",
    );
}

/// One ticker and the index over three calendar weeks, weekdays only.
fn write_weekday_fixture(dir: &Path) {
    let mut stock = String::from(
        "date,ticker,open,high,low,close,volume,company_name,sector,industry\n",
    );
    let mut index = String::from("trade_date,open,high,low,close,volume\n");
    let mut date = NaiveDate::from_ymd_opt(2018, 1, 8).unwrap();
    let end = NaiveDate::from_ymd_opt(2018, 1, 26).unwrap();
    let mut i = 0;
    while date <= end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            let close = 100.0 + i as f64 + if i % 2 == 0 { 0.0 } else { 0.7 };
            stock.push_str(&format!(
                "{date},AAPL,{},{},{},{close},1000,Apple Inc.,Technology,Hardware\n",
                close - 0.5,
                close + 1.0,
                close - 1.0,
            ));
            index.push_str(&format!("{date},{close},{close},{close},{close},1000\n"));
            i += 1;
        }
        date = date + Duration::days(1);
    }
    write_file(dir, "stock_daily.csv", &stock);
    write_file(dir, "index_daily.csv", &index);
    write_file(dir, "weather_daily.csv", "obs_date,alabama\n2018-01-08,0.4\n");
    write_file(
        dir,
        "sentiment_daily.csv",
        "news_date,depression_word_count,total_articles\n2018-01-08,12,4\n",
    );
    write_file(
        dir,
        "sentiment_weekly.csv",
        "week_end_date,depression_index\n2018-01-07,5.0\n",
    );
}

fn read_rows(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader
        .headers()
        .unwrap()
        .iter()
        .map(String::from)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (header, rows)
}

fn cell<'a>(header: &[String], row: &'a [String], name: &str) -> &'a str {
    let i = header.iter().position(|h| h == name).unwrap();
    &row[i]
}

#[test]
fn end_to_end_over_fixture_sources() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_fixture(input.path());

    let config = PipelineConfig::default();
    let mut sink = CsvSink::new(output.path());
    let summary = execute(
        &SourcePaths::from_dir(input.path()),
        &config,
        &mut sink,
        Some(&SilentProgress),
    )
    .unwrap();

    // All tables committed, no temp files left behind.
    for name in OUTPUT_TABLES {
        assert!(output.path().join(name).exists(), "{name} missing");
    }
    let leftovers: Vec<_> = std::fs::read_dir(output.path())
        .unwrap()
        .filter(|e| {
            e.as_ref()
                .unwrap()
                .path()
                .to_string_lossy()
                .ends_with(".tmp")
        })
        .collect();
    assert!(leftovers.is_empty());

    // Axis spans from the weekly observation to the last trading day.
    assert_eq!(summary.axis_start, NaiveDate::from_ymd_opt(2018, 1, 7).unwrap());
    assert_eq!(summary.axis_end, NaiveDate::from_ymd_opt(2018, 1, 10).unwrap());
    assert_eq!(summary.axis_days, 4);
    assert_eq!(summary.ticker_count, 2);

    // AAPL closes [100, 102, 101] produce returns [null, 0.02, -0.0098..].
    let (header, rows) = read_rows(&output.path().join("ticker_daily.csv"));
    let aapl: Vec<&Vec<String>> = rows
        .iter()
        .filter(|r| cell(&header, r, "ticker") == "AAPL")
        .collect();
    assert_eq!(aapl.len(), 4);
    assert_eq!(cell(&header, aapl[0], "trade_date"), "2018-01-07");
    assert_eq!(cell(&header, aapl[0], "close"), "");
    assert_eq!(cell(&header, aapl[1], "daily_return"), "");
    let r2: f64 = cell(&header, aapl[2], "daily_return").parse().unwrap();
    assert!((r2 - 0.02).abs() < 1e-9);
    let r3: f64 = cell(&header, aapl[3], "daily_return").parse().unwrap();
    assert!((r3 - (101.0 / 102.0 - 1.0)).abs() < 1e-9);

    // Sector mean on 2018-01-09: (0.02 + 0.04) / 2 with both tickers.
    let (header, rows) = read_rows(&output.path().join("sector_daily.csv"));
    let tech_jan9: Vec<&Vec<String>> = rows
        .iter()
        .filter(|r| {
            cell(&header, r, "date") == "2018-01-09"
                && cell(&header, r, "sector") == "Technology"
        })
        .collect();
    assert_eq!(tech_jan9.len(), 1);
    let mean: f64 = cell(&header, tech_jan9[0], "avg_daily_return")
        .parse()
        .unwrap();
    assert!((mean - 0.03).abs() < 1e-9);
    assert_eq!(cell(&header, tech_jan9[0], "ticker_count"), "2");

    // The weekly index takes effect the day after its week end.
    let (header, rows) = read_rows(&output.path().join("merged_time_series.csv"));
    let idx_by_date: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| {
            (
                cell(&header, r, "date"),
                cell(&header, r, "depression_index"),
            )
        })
        .collect();
    assert_eq!(idx_by_date[0], ("2018-01-07", ""));
    assert_eq!(idx_by_date[1], ("2018-01-08", "5"));
    assert_eq!(idx_by_date[3], ("2018-01-10", "5"));

    // Zero-article day has a null per-article average.
    let avg_jan10 = rows
        .iter()
        .find(|r| cell(&header, r, "date") == "2018-01-10")
        .map(|r| cell(&header, r, "avg_depression_per_article"))
        .unwrap();
    assert_eq!(avg_jan10, "");

    // National average covers only the reporting regions.
    let rain_jan9 = rows
        .iter()
        .find(|r| cell(&header, r, "date") == "2018-01-09")
        .map(|r| cell(&header, r, "avg_rainfall_us"))
        .unwrap();
    let rain: f64 = rain_jan9.parse().unwrap();
    assert!((rain - 0.4).abs() < 1e-9);
}

#[test]
fn weekend_gaps_do_not_null_trailing_metrics() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_weekday_fixture(input.path());

    let config = PipelineConfig::default();
    let mut sink = CsvSink::new(output.path());
    execute(
        &SourcePaths::from_dir(input.path()),
        &config,
        &mut sink,
        Some(&SilentProgress),
    )
    .unwrap();

    let (header, rows) = read_rows(&output.path().join("ticker_daily.csv"));
    let by_date = |d: &str| {
        rows.iter()
            .find(|r| cell(&header, r, "trade_date") == d)
            .unwrap()
    };

    // Saturday is a gap row with no fabricated values.
    assert_eq!(cell(&header, by_date("2018-01-13"), "close"), "");
    assert_eq!(cell(&header, by_date("2018-01-13"), "daily_return"), "");

    // Monday's return is against the previous Friday's close.
    let friday: f64 = cell(&header, by_date("2018-01-12"), "close").parse().unwrap();
    let monday: f64 = cell(&header, by_date("2018-01-15"), "close").parse().unwrap();
    let monday_return: f64 = cell(&header, by_date("2018-01-15"), "daily_return")
        .parse()
        .unwrap();
    assert!((monday_return - (monday / friday - 1.0)).abs() < 1e-9);

    // The 7-return window fills on the eighth trading day and stays
    // filled across later weekends.
    assert_eq!(cell(&header, by_date("2018-01-16"), "volatility"), "");
    assert!(!cell(&header, by_date("2018-01-17"), "volatility").is_empty());
    assert!(!cell(&header, by_date("2018-01-26"), "volatility").is_empty());

    // Index metrics survive the weekend the same way.
    let (header, rows) = read_rows(&output.path().join("merged_time_series.csv"));
    let by_date = |d: &str| {
        rows.iter()
            .find(|r| cell(&header, r, "date") == d)
            .unwrap()
    };
    assert!(!cell(&header, by_date("2018-01-15"), "index_return").is_empty());
    assert!(!cell(&header, by_date("2018-01-26"), "index_volatility").is_empty());
}

#[test]
fn ambiguous_integer_dates_fail_in_normalize() {
    let input = tempfile::tempdir().unwrap();
    write_fixture(input.path());
    // 5_000_000 fits neither epoch-days nor epoch-seconds.
    write_file(
        input.path(),
        "index_daily.csv",
        "trade_date,open,high,low,close,volume\n5000000,1,1,1,1,1\n",
    );

    let config = PipelineConfig::default();
    let mut sink = CsvSink::new(tempfile::tempdir().unwrap().path());
    let err = execute(
        &SourcePaths::from_dir(input.path()),
        &config,
        &mut sink,
        None,
    )
    .unwrap_err();
    assert_eq!(err.stage, Stage::Normalize);
    assert!(err.to_string().contains("ambiguous"));
}

#[test]
fn restricted_window_outside_data_fails_in_align() {
    let input = tempfile::tempdir().unwrap();
    write_fixture(input.path());

    let config = PipelineConfig {
        start: NaiveDate::from_ymd_opt(2019, 1, 1),
        end: NaiveDate::from_ymd_opt(2019, 2, 1),
        ..Default::default()
    };
    let mut sink = CsvSink::new(tempfile::tempdir().unwrap().path());
    let err = execute(
        &SourcePaths::from_dir(input.path()),
        &config,
        &mut sink,
        None,
    )
    .unwrap_err();
    assert_eq!(err.stage, Stage::Align);
}

#[test]
fn synthetic_sources_run_end_to_end() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_synthetic_sources(
        input.path(),
        NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2018, 3, 31).unwrap(),
        &["AAA", "BBB", "CCC", "DDD"],
    )
    .unwrap();

    let config = PipelineConfig::default();
    let mut sink = CsvSink::new(output.path());
    let summary = execute(
        &SourcePaths::from_dir(input.path()),
        &config,
        &mut sink,
        None,
    )
    .unwrap();

    assert_eq!(summary.ticker_count, 4);
    assert!(summary.axis_days >= 90);
    assert!(summary.row_counts["sector_daily"] > 0);
    assert!(!summary.dataset_hash.is_empty());
    assert!(!summary.top_pairs.is_empty());

    // The weekday-only synthetic data still yields populated trailing
    // metrics somewhere in the per-ticker table.
    let (header, rows) = read_rows(&output.path().join("ticker_daily.csv"));
    assert!(rows
        .iter()
        .any(|r| !cell(&header, r, "volatility").is_empty()));

    // Same inputs and config give the same run id and dataset hash.
    let output2 = tempfile::tempdir().unwrap();
    let mut sink2 = CsvSink::new(output2.path());
    let summary2 = execute(
        &SourcePaths::from_dir(input.path()),
        &config,
        &mut sink2,
        None,
    )
    .unwrap();
    assert_eq!(summary.run_id, summary2.run_id);
    assert_eq!(summary.dataset_hash, summary2.dataset_hash);
}
