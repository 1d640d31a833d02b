//! Historical storm catalog: track data and loaders

mod data;
pub mod loader;

pub use data::{Catalog, Category, StormTrack, TrackPoint};
pub use loader::{load_catalog, load_hurdat2, load_track_csv, parse_hurdat2, load_track_csv_from_reader};
