//! Request/response orchestration around the exposure and pricing engines

mod engine;
mod request;
mod runner;

pub use engine::{
    EngineConfig, EventSummary, QuoteEngine, QuoteResult, QuoteSummary, ScenarioSummary, DEFAULT_LAST_YEAR,
};
pub use request::QuoteRequest;
pub use runner::QuoteRunner;
