//! Load zones and payout tables from CSV

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{Reader, ReaderBuilder};

use super::payout::zone_column_id;
use super::{PayoutTable, PayoutTier, Zone};
use crate::error::{Error, Result};

/// Raw CSV row of a zone file (`id,lat,lon,radius_km,limit`)
#[derive(Debug, serde::Deserialize)]
struct ZoneRow {
    #[serde(alias = "ID")]
    id: u32,
    #[serde(alias = "Lat")]
    lat: f64,
    #[serde(alias = "Lon")]
    lon: f64,
    #[serde(alias = "Radius", alias = "radius")]
    radius_km: f64,
    #[serde(alias = "Limit")]
    limit: f64,
}

/// Load zones from any reader
pub fn load_zones_from_reader<R: Read>(reader: R) -> Result<Vec<Zone>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut zones = Vec::new();

    for result in csv_reader.deserialize() {
        let row: ZoneRow = result?;
        zones.push(Zone::new(row.id, row.lat, row.lon, row.radius_km, row.limit));
    }

    Ok(zones)
}

/// Load zones from a CSV file
pub fn load_zones_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Zone>> {
    load_zones_from_reader(File::open(path)?)
}

/// Load a payout table from any reader.
///
/// The first column is the tier threshold (`min_speed`, km/h); the remaining
/// columns are `C{id}` zone columns or a generic `payout` column. Empty cells
/// leave the zone without an explicit value for that tier.
pub fn load_payout_table_from_reader<R: Read>(reader: R) -> Result<PayoutTable> {
    let mut csv_reader = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    enum Column {
        Zone(u32),
        Fallback,
    }

    let threshold_name = headers.get(0).unwrap_or("");
    if !threshold_name.eq_ignore_ascii_case("min_speed") {
        return Err(Error::malformed(format!(
            "payout table must start with a min_speed column, found {:?}",
            threshold_name
        )));
    }
    let columns = headers
        .iter()
        .skip(1)
        .map(|name| {
            if name.eq_ignore_ascii_case("payout") {
                Ok(Column::Fallback)
            } else {
                zone_column_id(name)
                    .map(Column::Zone)
                    .ok_or_else(|| Error::malformed(format!("unknown payout column {:?}", name)))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let mut tiers = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let record = result?;
        let line = idx + 2;
        let number = |raw: &str| {
            raw.parse::<f64>().map_err(|_| Error::Parse {
                line,
                message: format!("non-numeric payout value {:?}", raw),
            })
        };

        let mut tier = PayoutTier::new(number(record.get(0).unwrap_or(""))?);
        for (column, raw) in columns.iter().zip(record.iter().skip(1)) {
            if raw.is_empty() {
                continue;
            }
            let value = number(raw)?;
            tier = match column {
                Column::Zone(id) => tier.with_zone(*id, value),
                Column::Fallback => tier.with_fallback(value),
            };
        }
        tiers.push(tier);
    }

    Ok(PayoutTable::new(tiers))
}

/// Load a payout table from a CSV file
pub fn load_payout_table_csv<P: AsRef<Path>>(path: P) -> Result<PayoutTable> {
    load_payout_table_from_reader(File::open(path)?)
}
