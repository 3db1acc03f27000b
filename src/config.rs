//! Parsing of external configuration inputs: sampling rules, the
//! agent-returned priority table, and buffer options.
//!
//! This is the one part of the crate explicitly allowed to fail loudly: it
//! runs at startup/reconfiguration time, off the hot path, and a malformed
//! input here must never reach `buffer` or `sampling` as an invalid value.

use std::collections::HashMap;

use regex::Regex;
use serde::Deserialize;

use crate::sampling::Rule;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct RawRule {
    name: Option<String>,
    service: Option<String>,
    sample_rate: f64,
}

fn compile_rate(rate: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(Error::RateOutOfRange(rate));
    }
    Ok(rate)
}

fn compile_pattern(pattern: Option<String>) -> Result<Option<Regex>> {
    pattern.map(|p| Regex::new(&p).map_err(Error::from)).transpose()
}

/// Parses the `sampling_rules` textual form: a JSON array of
/// `{name?, service?, sample_rate}` objects, preserving declaration order.
pub fn parse_rules(json: &str) -> Result<Vec<Rule>> {
    let raw: Vec<RawRule> = serde_json::from_str(json)?;
    raw.into_iter()
        .map(|r| {
            let rate = compile_rate(r.sample_rate)?;
            let name_pattern = compile_pattern(r.name)?;
            let service_pattern = compile_pattern(r.service)?;
            Ok(Rule::new(name_pattern, service_pattern, rate))
        })
        .collect()
}

/// Parses the agent-returned priority table: a flat JSON object of
/// `string -> number`.
pub fn parse_priority_table(json: &str) -> Result<HashMap<String, f64>> {
    let table: HashMap<String, f64> = serde_json::from_str(json)?;
    for (key, &rate) in &table {
        if !(0.0..=1.0).contains(&rate) {
            return Err(Error::Config(format!("priority table entry {key} has rate {rate} outside [0, 1]")));
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rules_in_declaration_order() {
        let json = r#"[{"sample_rate":0.3},{"name":"op","service":"svc","sample_rate":0.7}]"#;
        let rules = parse_rules(json).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].rate(), 0.3);
        assert_eq!(rules[1].rate(), 0.7);
    }

    #[test]
    fn rejects_out_of_range_sample_rate() {
        let json = r#"[{"sample_rate":1.5}]"#;
        assert!(matches!(parse_rules(json), Err(Error::RateOutOfRange(_))));
    }

    #[test]
    fn rejects_invalid_regex_pattern() {
        let json = r#"[{"name":"(unterminated","sample_rate":0.5}]"#;
        assert!(matches!(parse_rules(json), Err(Error::InvalidPattern(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        let json = "not json";
        assert!(matches!(parse_rules(json), Err(Error::Json(_))));
    }

    #[test]
    fn parses_priority_table() {
        let json = r#"{"service:nginx,env:":0.8,"service:nginx,env:prod":0.2}"#;
        let table = parse_priority_table(json).unwrap();
        assert_eq!(table.get("service:nginx,env:"), Some(&0.8));
        assert_eq!(table.get("service:nginx,env:prod"), Some(&0.2));
    }

    #[test]
    fn rejects_priority_table_rate_out_of_range() {
        let json = r#"{"service:nginx,env:":2.0}"#;
        assert!(matches!(parse_priority_table(json), Err(Error::Config(_))));
    }
}
