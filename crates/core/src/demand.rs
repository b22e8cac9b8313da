// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Demand/capability matching.
//!
//! A job declares [`Demand`]s; a worker advertises capabilities as a flat
//! string map. A worker is eligible for a job when every demand holds.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Properties a worker advertises about itself.
pub type Capabilities = HashMap<String, String>;

/// Errors from demand evaluation.
///
/// These indicate a misconfigured job or a version skew between the job
/// author and this engine, never a legitimate mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DemandError {
    #[error("unsupported demand operator '{operator}' on key '{key}'")]
    UnsupportedOperator { key: String, operator: String },

    #[error("invalid demand pattern '{pattern}' on key '{key}': {reason}")]
    InvalidPattern { key: String, pattern: String, reason: String },
}

/// How a demand value is compared against a capability.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DemandOperator {
    /// Capability value must equal the demand value
    #[default]
    Equals,
    /// Capability key must be present; value ignored
    Exists,
    /// Capability value must match the demand value as a regular expression
    Match,
    /// Operator tag this engine does not know (kept for error reporting)
    Unsupported(String),
}

impl DemandOperator {
    pub fn as_str(&self) -> &str {
        match self {
            DemandOperator::Equals => "equals",
            DemandOperator::Exists => "exists",
            DemandOperator::Match => "match",
            DemandOperator::Unsupported(tag) => tag,
        }
    }
}

impl std::fmt::Display for DemandOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DemandOperator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DemandOperator {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.to_ascii_lowercase().as_str() {
            "equals" => DemandOperator::Equals,
            "exists" => DemandOperator::Exists,
            "match" => DemandOperator::Match,
            _ => DemandOperator::Unsupported(s),
        })
    }
}

/// A single eligibility requirement a job places on a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demand {
    pub key: String,
    #[serde(default)]
    pub operator: DemandOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Demand {
    pub fn exists(key: impl Into<String>) -> Self {
        Self { key: key.into(), operator: DemandOperator::Exists, value: None }
    }

    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), operator: DemandOperator::Equals, value: Some(value.into()) }
    }

    pub fn matching(key: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self { key: key.into(), operator: DemandOperator::Match, value: Some(pattern.into()) }
    }

    /// Evaluate this demand against a worker's capabilities.
    pub fn is_satisfied_by(&self, capabilities: &Capabilities) -> Result<bool, DemandError> {
        let mut candidates = capabilities
            .iter()
            .filter(|(key, _)| same_key(key, &self.key))
            .map(|(_, value)| value.as_str());

        match &self.operator {
            DemandOperator::Exists => Ok(candidates.next().is_some()),
            DemandOperator::Equals => {
                let Some(expected) = self.value.as_deref() else {
                    return Ok(false);
                };
                Ok(candidates.any(|value| value == expected))
            }
            DemandOperator::Match => {
                let Some(pattern) = self.value.as_deref() else {
                    return Ok(false);
                };
                let regex = Regex::new(pattern).map_err(|e| DemandError::InvalidPattern {
                    key: self.key.clone(),
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(candidates.any(|value| regex.is_match(value)))
            }
            DemandOperator::Unsupported(tag) => Err(DemandError::UnsupportedOperator {
                key: self.key.clone(),
                operator: tag.clone(),
            }),
        }
    }
}

/// Decide whether a worker with `capabilities` may run a job with `demands`.
///
/// - No demands always match, even without capabilities.
/// - Demands against absent or empty capabilities never match.
/// - Otherwise every demand must hold; evaluation stops at the first
///   demand that does not.
pub fn matches(
    demands: &[Demand],
    capabilities: Option<&Capabilities>,
) -> Result<bool, DemandError> {
    if demands.is_empty() {
        return Ok(true);
    }
    let capabilities = match capabilities {
        Some(c) if !c.is_empty() => c,
        _ => return Ok(false),
    };
    for demand in demands {
        if !demand.is_satisfied_by(capabilities)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn same_key(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
#[path = "demand_tests.rs"]
mod tests;
