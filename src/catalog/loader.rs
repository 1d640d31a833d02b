//! Load storm tracks from NOAA HURDAT2 text files and recent-season CSV files

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};

use super::{Catalog, StormTrack, TrackPoint};
use crate::error::{Error, Result};

/// Default location of the HURDAT2 Atlantic best-track file
pub const DEFAULT_HURDAT_PATH: &str = "data/hurdat2-1851-2024-040425.txt";

/// Year assigned to recent-season rows whose id and YEAR column are both unusable
pub const DEFAULT_RECENT_YEAR: i32 = 2025;

/// Parse a coordinate such as `"28.0N"`, `"94.8W"` or `"-66.5"` into signed degrees
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let last = s.chars().last()?;
    let (number, sign) = match last.to_ascii_uppercase() {
        'N' | 'E' => (&s[..s.len() - 1], 1.0),
        'S' | 'W' => (&s[..s.len() - 1], -1.0),
        _ => (s, 1.0),
    };
    number.trim().parse::<f64>().ok().map(|v| v * sign)
}

/// Storm year encoded in a HURDAT2 key (`AL` + number + year, e.g. `AL152017`)
fn year_from_storm_id(id: &str) -> Option<i32> {
    id.get(4..8).and_then(|y| y.parse().ok())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
        .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

/// Times arrive as `"0600"`, `"600"`, `"06:00"` or empty (00Z)
fn parse_time(raw: &str) -> Option<NaiveTime> {
    let digits: String = raw.trim().chars().filter(|c| *c != ':').collect();
    if digits.is_empty() {
        return NaiveTime::from_hms_opt(0, 0, 0);
    }
    let padded = format!("{:0>4}", digits);
    NaiveTime::parse_from_str(padded.get(..4)?, "%H%M").ok()
}

/// Parse HURDAT2 text from any reader.
///
/// Header lines have exactly four comma-separated fields (`id, name, rows,`);
/// every other non-blank line is a fix of the most recent header's storm.
/// Fixes with missing or non-positive wind are dropped.
pub fn parse_hurdat2<R: BufRead>(reader: R) -> Result<Vec<StormTrack>> {
    let mut storms: Vec<StormTrack> = Vec::new();
    let mut rows_in_storm = 0u32;
    let mut dropped = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() == 4 {
            let id = parts[0].trim();
            let year = year_from_storm_id(id).unwrap_or(0);
            storms.push(StormTrack::new(id, parts[1].trim(), year));
            rows_in_storm = 0;
            continue;
        }

        let storm = storms.last_mut().ok_or_else(|| Error::Parse {
            line: line_no,
            message: "track fix before any storm header".to_string(),
        })?;
        if parts.len() < 7 {
            return Err(Error::Parse {
                line: line_no,
                message: format!("expected at least 7 fields, found {}", parts.len()),
            });
        }

        let parse_err = |what: &str, value: &str| Error::Parse {
            line: line_no,
            message: format!("invalid {}: {:?}", what, value.trim()),
        };
        let date = parse_date(parts[0]).ok_or_else(|| parse_err("date", parts[0]))?;
        let time = parse_time(parts[1]).ok_or_else(|| parse_err("time", parts[1]))?;
        let lat = parse_coordinate(parts[4]).ok_or_else(|| parse_err("latitude", parts[4]))?;
        let lon = parse_coordinate(parts[5]).ok_or_else(|| parse_err("longitude", parts[5]))?;
        let wind_kt: f64 = parts[6].trim().parse().unwrap_or(0.0);

        let sequence = rows_in_storm;
        rows_in_storm += 1;
        if wind_kt <= 0.0 {
            dropped += 1;
            continue;
        }

        let point = TrackPoint::new(
            storm.id.clone(),
            sequence,
            NaiveDateTime::new(date, time),
            lat,
            lon,
            wind_kt,
        )
        .with_status(parts[3].trim());
        storm.points.push(point);
    }

    debug!("HURDAT2: {} storms parsed, {} fixes without wind dropped", storms.len(), dropped);
    Ok(storms)
}

/// Load a HURDAT2 file
pub fn load_hurdat2<P: AsRef<Path>>(path: P) -> Result<Catalog> {
    let file = File::open(path.as_ref())?;
    let storms = parse_hurdat2(BufReader::new(file))?;
    let catalog = Catalog::new(storms);
    info!(
        "Loaded {} storms ({} fixes) from {}",
        catalog.len(),
        catalog.point_count(),
        path.as_ref().display()
    );
    Ok(catalog)
}

/// Raw CSV row of a recent-season track file; headers are matched case-insensitively
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "HID", alias = "HURACANID")]
    hid: String,
    #[serde(rename = "NAME", alias = "HNAME", default)]
    name: Option<String>,
    #[serde(rename = "DATE")]
    date: String,
    #[serde(rename = "TIME", alias = "TIME_UTC", default)]
    time: Option<String>,
    #[serde(rename = "LAT", alias = "LATITUDE")]
    lat: String,
    #[serde(rename = "LON", alias = "LONGITUDE")]
    lon: String,
    #[serde(rename = "WIND", alias = "WINDSPEED_KT", default)]
    wind: Option<f64>,
    #[serde(rename = "STATUS", default)]
    status: Option<String>,
    #[serde(rename = "YEAR", default)]
    year: Option<i32>,
}

impl CsvRow {
    fn to_point(&self, sequence: u32, line: usize) -> Result<TrackPoint> {
        let parse_err = |what: &str, value: &str| Error::Parse {
            line,
            message: format!("invalid {}: {:?}", what, value),
        };
        let date = parse_date(&self.date).ok_or_else(|| parse_err("date", &self.date))?;
        let time_raw = self.time.as_deref().unwrap_or("");
        let time = parse_time(time_raw).ok_or_else(|| parse_err("time", time_raw))?;
        let lat = parse_coordinate(&self.lat).ok_or_else(|| parse_err("latitude", &self.lat))?;
        let lon = parse_coordinate(&self.lon).ok_or_else(|| parse_err("longitude", &self.lon))?;

        Ok(TrackPoint::new(
            self.hid.trim(),
            sequence,
            NaiveDateTime::new(date, time),
            lat,
            lon,
            self.wind.unwrap_or(0.0),
        )
        .with_status(self.status.clone().unwrap_or_else(|| "HU".to_string())))
    }
}

/// Load recent-season tracks from any CSV reader
pub fn load_track_csv_from_reader<R: Read>(reader: R, default_year: i32) -> Result<Vec<StormTrack>> {
    let mut csv_reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: StringRecord = csv_reader
        .headers()?
        .iter()
        .map(|h| h.to_ascii_uppercase())
        .collect();

    let mut storms: Vec<StormTrack> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (idx, result) in csv_reader.records().enumerate() {
        let record = result?;
        let row: CsvRow = record.deserialize(Some(&headers))?;
        // Header is line 1
        let line = idx + 2;

        let i = *index.entry(row.hid.trim().to_string()).or_insert_with(|| {
            let id = row.hid.trim();
            let year = year_from_storm_id(id).or(row.year).unwrap_or(default_year);
            let name = row.name.clone().unwrap_or_else(|| "UNKNOWN".to_string());
            storms.push(StormTrack::new(id, name.trim(), year));
            storms.len() - 1
        });

        let storm = &mut storms[i];
        let point = row.to_point(storm.points.len() as u32, line)?;
        if point.wind_kt > 0.0 {
            storm.points.push(point);
        }
    }

    Ok(storms)
}

/// Load a recent-season track CSV file
pub fn load_track_csv<P: AsRef<Path>>(path: P, default_year: i32) -> Result<Catalog> {
    let file = File::open(path.as_ref())?;
    let catalog = Catalog::new(load_track_csv_from_reader(file, default_year)?);
    info!(
        "Loaded {} storms ({} fixes) from {}",
        catalog.len(),
        catalog.point_count(),
        path.as_ref().display()
    );
    Ok(catalog)
}

/// Load the HURDAT2 history, optionally topped up with a recent-season CSV
pub fn load_catalog(hurdat_path: &Path, recent_path: Option<&Path>) -> Result<Catalog> {
    let mut catalog = load_hurdat2(hurdat_path)?;
    if let Some(recent) = recent_path {
        catalog.merge(load_track_csv(recent, DEFAULT_RECENT_YEAR)?);
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const HURDAT_SAMPLE: &str = "\
AL011851,            UNNAMED,     3,
18510625, 0000,  , HU, 28.0N,  94.8W,  80, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999,
18510625, 0600,  , HU, 28.0N,  95.4W,  80, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999,
18510625, 1200,  , TS, 28.0N,  96.0W, -99, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999,
AL152017,              MARIA,     2,
20170920, 1015,  L, HU, 18.0N,  65.9W, 135,  920, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999,
20170920, 1200,  , HU, 18.3S,  66.3E, 115,  935, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999, -999,
";

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("28.0N"), Some(28.0));
        assert_eq!(parse_coordinate(" 94.8W"), Some(-94.8));
        assert_eq!(parse_coordinate("12.5S"), Some(-12.5));
        assert_eq!(parse_coordinate("-66.5"), Some(-66.5));
        assert_eq!(parse_coordinate("abc"), None);
        assert_eq!(parse_coordinate(""), None);
    }

    #[test]
    fn test_parse_hurdat2() {
        let storms = parse_hurdat2(HURDAT_SAMPLE.as_bytes()).unwrap();
        assert_eq!(storms.len(), 2);

        let first = &storms[0];
        assert_eq!(first.id, "AL011851");
        assert_eq!(first.name, "UNNAMED");
        assert_eq!(first.year, 1851);
        // Negative wind fix dropped
        assert_eq!(first.points.len(), 2);
        assert_relative_eq!(first.points[1].lon, -95.4);

        let maria = &storms[1];
        assert_eq!(maria.year, 2017);
        assert_eq!(maria.points[0].timestamp.format("%Y-%m-%d %H:%M").to_string(), "2017-09-20 10:15");
        assert_eq!(maria.points[0].status.as_deref(), Some("HU"));
        assert_relative_eq!(maria.points[1].lat, -18.3);
        assert_relative_eq!(maria.points[1].lon, 66.3);
    }

    #[test]
    fn test_parse_hurdat2_rejects_orphan_fix() {
        let text = "18510625, 0000,  , HU, 28.0N,  94.8W,  80, -999,\n";
        let err = parse_hurdat2(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_parse_hurdat2_rejects_bad_latitude() {
        let text = "AL011851, UNNAMED, 1,\n18510625, 0000,  , HU, XXN,  94.8W,  80, -999,\n";
        let err = parse_hurdat2(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn test_load_track_csv_from_reader() {
        let csv = "\
hid,hname,date,time_utc,latitude,longitude,windspeed_kt
AL052025,ERIN,20250815,600,18.1N,60.2W,110
AL052025,ERIN,20250815,1200,18.9,-61.5,125
AL052025,ERIN,20250815,1800,19.5N,62.5W,
XX,NONAME,2025-08-20,00:00,20.0N,70.0W,45
";
        let storms = load_track_csv_from_reader(csv.as_bytes(), 2025).unwrap();
        assert_eq!(storms.len(), 2);

        let erin = &storms[0];
        assert_eq!(erin.name, "ERIN");
        assert_eq!(erin.year, 2025);
        // Empty wind dropped
        assert_eq!(erin.points.len(), 2);
        assert_eq!(erin.points[0].timestamp.format("%H%M").to_string(), "0600");
        assert_relative_eq!(erin.points[1].lon, -61.5);

        // Year falls back to the default when the id has none
        assert_eq!(storms[1].year, 2025);
    }

    #[test]
    fn test_load_track_csv_year_column() {
        let csv = "HID,NAME,DATE,TIME,LAT,LON,WIND,YEAR\nX1,TEST,20240901,0000,10N,50W,60,2024\n";
        let storms = load_track_csv_from_reader(csv.as_bytes(), 2025).unwrap();
        assert_eq!(storms[0].year, 2024);
    }
}
