//! Text formatting and CSV reports of quote results

use std::io::Write;
use std::path::Path;

use crate::exposure::{AnnualSeries, EventResult};
use crate::error::Result;

/// Whole-dollar amount with thousands separators, e.g. `$1,250,000`
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Fraction as a percentage with two decimals, e.g. `0.0243` -> `2.43%`
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Write triggering events, one row per storm
pub fn write_events_csv<W: Write>(writer: W, events: &[EventResult]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "StormID",
        "Name",
        "Year",
        "PeakCategory",
        "RawPayout",
        "EventPayout",
        "AsymmetricPayout",
        "EventCapApplied",
        "AdjustedPayout",
        "Breakdown",
    ])?;
    for event in events {
        csv_writer.write_record([
            event.storm_id.clone(),
            event.name.clone(),
            event.year.to_string(),
            event.peak_category.as_str().to_string(),
            format!("{:.2}", event.raw_payout),
            format!("{:.2}", event.payout),
            format!("{:.2}", event.asymmetric_payout),
            event.event_cap_applied.to_string(),
            format!("{:.2}", event.adjusted_payout),
            event.breakdown_text(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the dense annual loss series
pub fn write_annual_csv<W: Write>(writer: W, annual: &AnnualSeries) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Year", "AnnualPayout"])?;
    for (year, loss) in annual.iter() {
        csv_writer.write_record([year.to_string(), format!("{:.2}", loss)])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write `events.csv` and `annual_losses.csv` into `dir`
pub fn write_reports(dir: &Path, events: &[EventResult], annual: &AnnualSeries) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    write_events_csv(std::fs::File::create(dir.join("events.csv"))?, events)?;
    write_annual_csv(std::fs::File::create(dir.join("annual_losses.csv"))?, annual)?;
    Ok(())
}
