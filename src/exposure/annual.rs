//! Annual aggregation: aggregate limit per calendar year and the dense loss series

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::event::EventResult;
use crate::report::format_currency;

/// First year of the HURDAT2 record
pub const FIRST_YEAR: i32 = 1851;

/// Total adjusted payout per calendar year, one entry for every year in range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualSeries {
    first_year: i32,
    losses: Vec<f64>,
}

impl AnnualSeries {
    /// All-zero series covering `[first_year, last_year]`
    pub fn zeros(first_year: i32, last_year: i32) -> Self {
        let len = (last_year - first_year + 1).max(0) as usize;
        Self {
            first_year,
            losses: vec![0.0; len],
        }
    }

    pub fn from_losses(first_year: i32, losses: Vec<f64>) -> Self {
        Self { first_year, losses }
    }

    pub fn first_year(&self) -> i32 {
        self.first_year
    }

    pub fn last_year(&self) -> i32 {
        self.first_year + self.losses.len() as i32 - 1
    }

    pub fn len(&self) -> usize {
        self.losses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }

    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.first_year..=self.last_year()
    }

    pub fn losses(&self) -> &[f64] {
        &self.losses
    }

    /// `(year, loss)` pairs in year order
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.years().zip(self.losses().iter().copied())
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        let idx = usize::try_from(year - self.first_year).ok()?;
        self.losses.get(idx).copied()
    }

    fn add(&mut self, year: i32, amount: f64) -> bool {
        match usize::try_from(year - self.first_year).ok().and_then(|i| self.losses.get_mut(i)) {
            Some(slot) => {
                *slot += amount;
                true
            }
            None => false,
        }
    }

    fn mean_of<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
        let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Mean over every year
    pub fn mean(&self) -> f64 {
        Self::mean_of(self.losses.iter())
    }

    /// Mean over years >= `year`
    pub fn mean_since(&self, year: i32) -> f64 {
        Self::mean_of(self.iter_since(year))
    }

    /// Mean over the most recent `n` years of the range
    pub fn mean_last(&self, n: usize) -> f64 {
        self.mean_since(self.last_year() - n as i32 + 1)
    }

    fn iter_since(&self, year: i32) -> impl Iterator<Item = &f64> {
        let skip = usize::try_from(year - self.first_year).unwrap_or(0);
        self.losses.iter().skip(skip)
    }

    pub fn is_all_zero(&self) -> bool {
        self.losses.iter().all(|&l| l == 0.0)
    }
}

/// Apply the annual aggregate limit and build the loss series.
///
/// Within each year, storms are taken in increasing storm-id order; each pays
/// at most the headroom left under `aggregate_limit`. Events left with no
/// payout are removed. Storms dated outside `[first_year, last_year]` are
/// dropped from both the series and the event list.
pub fn aggregate_annual(
    events: &mut Vec<EventResult>,
    aggregate_limit: f64,
    first_year: i32,
    last_year: i32,
) -> AnnualSeries {
    let mut series = AnnualSeries::zeros(first_year, last_year);
    let mut cumulative: BTreeMap<i32, f64> = BTreeMap::new();

    events.sort_by(|a, b| a.storm_id.cmp(&b.storm_id));

    for event in events.iter_mut() {
        if event.year < first_year || event.year > last_year {
            warn!(
                "{} {} ({}) is outside {}-{}; left out of the annual series",
                event.storm_id, event.name, event.year, first_year, last_year
            );
            event.adjusted_payout = 0.0;
            continue;
        }

        let paid = cumulative.entry(event.year).or_insert(0.0);
        let headroom = (aggregate_limit - *paid).max(0.0);
        let adjusted = event.payout.min(headroom);

        if adjusted < event.payout {
            event
                .breakdown
                .push(format!("[AGGREGATE] Annual clip to {}", format_currency(adjusted)));
            debug!("{} {}: annual clip {:.0} -> {:.0}", event.storm_id, event.name, event.payout, adjusted);
        }

        event.adjusted_payout = adjusted;
        *paid += adjusted;
        series.add(event.year, adjusted);
    }

    events.retain(|e| e.adjusted_payout > 0.0);
    series
}
