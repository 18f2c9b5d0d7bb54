//! Structured critique payloads, parsing, and severity scoring.
//!
//! The oracle is asked for a fixed-shape JSON object. Replies are parsed with
//! a strict, non-executing parser gated by a JSON Schema check; anything that
//! does not fit the shape collapses to a fallback critique so a bad reply can
//! never take the loop down.

use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow};
use jsonschema::{Validator, validator_for};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

const CRITIQUE_SCHEMA: &str = include_str!("../../schemas/critique_output.schema.json");

/// Message carried by the fallback critique's single critical error.
pub const MALFORMED_CRITIQUE_ERROR: &str = "malformed critique output";

/// Fix-free diagnosis of the current solution, as declared by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critique {
    pub critical_errors: Vec<String>,
    pub minor_issues: Vec<String>,
    pub missing_steps: Vec<String>,
    /// Oracle-reported confidence. Intended range [0, 1]; not clamped here.
    pub confidence: f64,
}

impl Critique {
    /// Critique substituted when the oracle reply cannot be parsed.
    pub fn malformed_fallback() -> Self {
        Self {
            critical_errors: vec![MALFORMED_CRITIQUE_ERROR.to_string()],
            minor_issues: Vec::new(),
            missing_steps: Vec::new(),
            confidence: 0.0,
        }
    }

    /// Normalized severity in [0, 1].
    ///
    /// Linear weighting (critical 1.0, missing 0.5, minor 0.2) with a soft
    /// cap: five weighted points saturate to 1.0.
    pub fn severity(&self) -> f64 {
        let critical = self.critical_errors.len() as f64;
        let missing = self.missing_steps.len() as f64;
        let minor = self.minor_issues.len() as f64;

        let weighted = 1.0 * critical + 0.5 * missing + 0.2 * minor;
        (weighted / 5.0).min(1.0)
    }
}

/// A critique together with the severity computed for it at logging time.
///
/// Pairing the two keeps improvement estimation honest: the decide step reads
/// past severities from here instead of recomputing from a live field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CritiqueRecord {
    pub critique: Critique,
    pub severity: f64,
}

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap()
});

static SCHEMA: LazyLock<Validator> = LazyLock::new(|| {
    let schema: Value =
        serde_json::from_str(CRITIQUE_SCHEMA).expect("bundled critique schema should parse");
    validator_for(&schema).expect("bundled critique schema should be valid")
});

/// Parse an oracle reply into a critique. Never fails: replies that do not
/// contain a schema-conforming JSON object yield [`Critique::malformed_fallback`].
pub fn parse_critique(raw: &str) -> Critique {
    match try_parse(raw) {
        Ok(critique) => critique,
        Err(err) => {
            warn!(err = %err, "critique reply rejected, substituting fallback");
            Critique::malformed_fallback()
        }
    }
}

fn try_parse(raw: &str) -> Result<Critique> {
    let json_text =
        extract_json_object(raw).ok_or_else(|| anyhow!("no JSON object in critique reply"))?;
    let value: Value = serde_json::from_str(json_text).context("parse critique json")?;
    validate_shape(&value)?;
    serde_json::from_value(value).context("deserialize critique")
}

/// Locate the JSON object inside a reply that may wrap it in a Markdown code
/// fence or surrounding prose. Takes a fenced block when present, otherwise
/// the outermost `{...}` span.
fn extract_json_object(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if let Some(caps) = FENCE_RE.captures(trimmed) {
        return Some(caps.get(1).unwrap().as_str());
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}

fn validate_shape(value: &Value) -> Result<()> {
    let messages: Vec<String> = SCHEMA.iter_errors(value).map(|err| err.to_string()).collect();
    if !messages.is_empty() {
        return Err(anyhow!("critique schema violations: {}", messages.join("; ")));
    }
    Ok(())
}
