//! Deterministic synthetic source generation.
//!
//! Produces the five source CSVs for demos and tests. Everything is
//! seeded from blake3 hashes of stable labels, so the same arguments
//! always generate byte-identical inputs.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

const SECTORS: [(&str, &str); 4] = [
    ("Technology", "Software"),
    ("Technology", "Hardware"),
    ("Energy", "Oil & Gas"),
    ("Health Care", "Pharmaceuticals"),
];

fn seeded_rng(label: &str) -> StdRng {
    let seed: [u8; 32] = *blake3::hash(label.as_bytes()).as_bytes();
    StdRng::from_seed(seed)
}

fn weekdays(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let days = (end - start).num_days();
    (0..=days)
        .map(move |i| start + Duration::days(i))
        .filter(|d| d.weekday() != Weekday::Sat && d.weekday() != Weekday::Sun)
}

/// Write all five synthetic source CSVs into `dir`.
pub fn write_synthetic_sources(
    dir: &Path,
    start: NaiveDate,
    end: NaiveDate,
    tickers: &[&str],
) -> Result<(), csv::Error> {
    write_stock(dir, start, end, tickers)?;
    write_index(dir, start, end)?;
    write_weather(dir, start, end)?;
    write_sentiment_daily(dir, start, end)?;
    write_sentiment_weekly(dir, start, end)?;
    Ok(())
}

fn write_stock(
    dir: &Path,
    start: NaiveDate,
    end: NaiveDate,
    tickers: &[&str],
) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_path(dir.join("stock_daily.csv"))?;
    w.write_record([
        "date",
        "ticker",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "company_name",
        "sector",
        "industry",
    ])?;
    for (t, ticker) in tickers.iter().enumerate() {
        let mut rng = seeded_rng(ticker);
        let (sector, industry) = SECTORS[t % SECTORS.len()];
        let company = format!("{ticker} Corp.");
        let mut price = rng.gen_range(20.0..200.0_f64);
        for date in weekdays(start, end) {
            let ret: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(100_000..5_000_000u64);
            w.write_record([
                date.to_string(),
                ticker.to_string(),
                format!("{open:.4}"),
                format!("{high:.4}"),
                format!("{low:.4}"),
                format!("{close:.4}"),
                volume.to_string(),
                company.clone(),
                sector.to_string(),
                industry.to_string(),
            ])?;
            price = close;
        }
    }
    w.flush()?;
    Ok(())
}

fn write_index(dir: &Path, start: NaiveDate, end: NaiveDate) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_path(dir.join("index_daily.csv"))?;
    w.write_record(["trade_date", "open", "high", "low", "close", "volume"])?;
    let mut rng = seeded_rng("market_index");
    let mut price = 2700.0_f64;
    for date in weekdays(start, end) {
        let ret: f64 = rng.gen_range(-0.02..0.02);
        let open = price;
        let close = price * (1.0 + ret);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
        let volume = rng.gen_range(2_000_000_000..4_000_000_000u64);
        w.write_record([
            date.to_string(),
            format!("{open:.2}"),
            format!("{high:.2}"),
            format!("{low:.2}"),
            format!("{close:.2}"),
            volume.to_string(),
        ])?;
        price = close;
    }
    w.flush()?;
    Ok(())
}

fn write_weather(dir: &Path, start: NaiveDate, end: NaiveDate) -> Result<(), csv::Error> {
    let regions = ["alabama", "alaska", "arizona", "california", "colorado"];
    let mut w = csv::Writer::from_path(dir.join("weather_daily.csv"))?;
    let mut header = vec!["obs_date".to_string()];
    header.extend(regions.iter().map(|r| r.to_string()));
    w.write_record(&header)?;
    let mut rng = seeded_rng("weather");
    let days = (end - start).num_days();
    for i in 0..=days {
        let date = start + Duration::days(i);
        let mut record = vec![date.to_string()];
        for _ in &regions {
            // Occasional dry reading of exactly zero.
            let rain: f64 = if rng.gen_range(0..4) == 0 {
                0.0
            } else {
                rng.gen_range(0.0..3.0)
            };
            record.push(format!("{rain:.2}"));
        }
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

fn write_sentiment_daily(dir: &Path, start: NaiveDate, end: NaiveDate) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_path(dir.join("sentiment_daily.csv"))?;
    w.write_record(["news_date", "depression_word_count", "total_articles"])?;
    let mut rng = seeded_rng("sentiment_daily");
    let days = (end - start).num_days();
    for i in 0..=days {
        let date = start + Duration::days(i);
        let articles = rng.gen_range(0..40u32);
        let words = if articles == 0 {
            0
        } else {
            rng.gen_range(0..articles * 6)
        };
        w.write_record([date.to_string(), words.to_string(), articles.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

fn write_sentiment_weekly(dir: &Path, start: NaiveDate, end: NaiveDate) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_path(dir.join("sentiment_weekly.csv"))?;
    w.write_record(["week_end_date", "depression_index"])?;
    let mut rng = seeded_rng("sentiment_weekly");
    let mut date = start;
    while date.weekday() != Weekday::Sun {
        date += Duration::days(1);
    }
    while date <= end {
        let index: f64 = rng.gen_range(0.0..10.0);
        w.write_record([date.to_string(), format!("{index:.3}")])?;
        date += Duration::days(7);
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn generation_is_deterministic() {
        let dir1 = tempfile::tempdir().unwrap();
        let dir2 = tempfile::tempdir().unwrap();
        let tickers = ["AAA", "BBB"];
        write_synthetic_sources(dir1.path(), d("2018-01-01"), d("2018-02-01"), &tickers).unwrap();
        write_synthetic_sources(dir2.path(), d("2018-01-01"), d("2018-02-01"), &tickers).unwrap();

        for name in [
            "stock_daily.csv",
            "index_daily.csv",
            "weather_daily.csv",
            "sentiment_daily.csv",
            "sentiment_weekly.csv",
        ] {
            let a = std::fs::read(dir1.path().join(name)).unwrap();
            let b = std::fs::read(dir2.path().join(name)).unwrap();
            assert_eq!(a, b, "{name} not deterministic");
        }
    }

    #[test]
    fn stock_file_carries_classification_columns() {
        let dir = tempfile::tempdir().unwrap();
        write_synthetic_sources(dir.path(), d("2018-01-01"), d("2018-01-10"), &["AAA"]).unwrap();
        let content = std::fs::read_to_string(dir.path().join("stock_daily.csv")).unwrap();
        let header = content.lines().next().unwrap();
        assert!(header.contains("sector"));
        assert!(header.contains("industry"));
        // Weekends excluded from trading rows.
        assert!(!content.contains("2018-01-06,"));
    }

    #[test]
    fn weekly_file_uses_sunday_week_ends() {
        let dir = tempfile::tempdir().unwrap();
        write_synthetic_sources(dir.path(), d("2018-01-01"), d("2018-01-31"), &["AAA"]).unwrap();
        let content = std::fs::read_to_string(dir.path().join("sentiment_weekly.csv")).unwrap();
        let mut lines = content.lines().skip(1);
        let first = lines.next().unwrap();
        assert!(first.starts_with("2018-01-07,"));
    }
}
