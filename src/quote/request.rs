//! Quote request as sent by the conversational front end or the CLI

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::program::{FractionMode, Limits, PayoutTable, Program, Zone, DEFAULT_ASYMMETRY_FACTOR};

/// Program terms to price
///
/// Field names follow the English schema; the tool-call payload's Spanish
/// names are accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Insured circles
    #[serde(alias = "ubicaciones")]
    pub zones: Vec<Zone>,

    /// Payout fractions by wind-speed tier
    #[serde(alias = "tabla_pagos")]
    pub payout_table: PayoutTable,

    #[serde(alias = "limite_evento")]
    pub event_limit: f64,

    #[serde(alias = "limite_agregado")]
    pub aggregate_limit: f64,

    /// Discount on left-side payouts (default: 0.5)
    #[serde(alias = "factor_asimetrico", default = "default_asymmetry_factor")]
    pub asymmetry_factor: f64,

    #[serde(default)]
    pub fraction_mode: FractionMode,

    /// Free-form client name, echoed into the summary
    #[serde(alias = "cliente", default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
}

fn default_asymmetry_factor() -> f64 { DEFAULT_ASYMMETRY_FACTOR }

impl QuoteRequest {
    /// Parse a JSON request. Missing or mistyped fields are `MalformedInput`.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::malformed(format!("invalid quote request: {}", e)))
    }

    /// Read and parse a JSON request file
    pub fn from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            event: self.event_limit,
            aggregate: self.aggregate_limit,
        }
    }

    /// Validate the terms into a `Program`
    pub fn to_program(&self) -> Result<Program> {
        Program::new(
            self.zones.clone(),
            self.payout_table.clone(),
            self.limits(),
            self.asymmetry_factor,
            self.fraction_mode,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOOL_CALL: &str = r#"{
        "ubicaciones": [{"id": 1, "lat": 18.0, "lon": -66.0, "radio": 50, "limite": 1000000}],
        "tabla_pagos": [
            {"min_speed": 0, "C1": 0},
            {"min_speed": 200, "C1": 50},
            {"min_speed": 280, "C1": 100}
        ],
        "limite_evento": 1000000,
        "limite_agregado": 2000000
    }"#;

    #[test]
    fn test_tool_call_aliases() {
        let request = QuoteRequest::from_json(TOOL_CALL).unwrap();
        assert_eq!(request.zones[0].radius_km, 50.0);
        assert_eq!(request.zones[0].limit, 1_000_000.0);
        assert_eq!(request.event_limit, 1_000_000.0);
        assert_eq!(request.aggregate_limit, 2_000_000.0);
        assert_eq!(request.asymmetry_factor, 0.5);
        assert_eq!(request.fraction_mode, FractionMode::Auto);
        assert!(request.client.is_none());

        // Percent-style values read as fractions
        let program = request.to_program().unwrap();
        assert_eq!(program.table().resolve(250.0, 1), 0.5);
        assert_eq!(program.table().resolve(300.0, 1), 1.0);
    }

    #[test]
    fn test_english_field_names() {
        let json = r#"{
            "zones": [{"id": 3, "lat": 25.0, "lon": -80.0, "radius_km": 30, "limit": 500000}],
            "payout_table": [{"min_speed_kmh": 150, "payout": 0.25}],
            "event_limit": 500000,
            "aggregate_limit": 500000,
            "asymmetry_factor": 0.8,
            "fraction_mode": "strict",
            "client": "Gobierno de Prueba"
        }"#;
        let request = QuoteRequest::from_json(json).unwrap();
        assert_eq!(request.asymmetry_factor, 0.8);
        assert_eq!(request.fraction_mode, FractionMode::Strict);
        assert_eq!(request.client.as_deref(), Some("Gobierno de Prueba"));
        assert_eq!(request.to_program().unwrap().table().resolve(160.0, 3), 0.25);
    }

    #[test]
    fn test_missing_limit_is_malformed() {
        let json = r#"{"zones": [], "payout_table": [], "event_limit": 1}"#;
        assert!(matches!(QuoteRequest::from_json(json), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_non_numeric_limit_is_malformed() {
        let json = TOOL_CALL.replace("\"limite_evento\": 1000000", "\"limite_evento\": \"un millon\"");
        assert!(matches!(QuoteRequest::from_json(&json), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_percent_string_fraction_is_malformed() {
        let json = TOOL_CALL.replace("\"C1\": 50", "\"C1\": \"50%\"");
        assert!(matches!(QuoteRequest::from_json(&json), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_strict_mode_rejects_percentages() {
        let mut request = QuoteRequest::from_json(TOOL_CALL).unwrap();
        request.fraction_mode = FractionMode::Strict;
        assert!(matches!(request.to_program(), Err(Error::MalformedInput(_))));
    }

    #[test]
    fn test_fraction_above_one_is_malformed() {
        let json = TOOL_CALL.replace("{\"min_speed\": 0, \"C1\": 0}", "{\"min_speed_kmh\": 0, \"C1\": 150}");
        let request = QuoteRequest::from_json(&json).unwrap();
        assert_eq!(request.payout_table.tiers()[0].raw_value(1), 150.0);
        assert!(matches!(request.to_program(), Err(Error::MalformedInput(_))));
    }
}
