use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ReachError, Result};

/// Distribution family named by the `dist` tag of a raw spec.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DistributionKind {
    Fixed,
    Triangular,
    Pert,
    Lognormal,
}

impl DistributionKind {
    /// Case-insensitive tag lookup.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "FIXED" => Some(Self::Fixed),
            "TRIANGULAR" => Some(Self::Triangular),
            "PERT" => Some(Self::Pert),
            "LOGNORMAL" => Some(Self::Lognormal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "FIXED",
            Self::Triangular => "TRIANGULAR",
            Self::Pert => "PERT",
            Self::Lognormal => "LOGNORMAL",
        }
    }
}

/// Validated distribution spec for a probability or magnitude.
///
/// Three-point variants always satisfy `min <= mode <= max` with finite
/// values; build them through the checked constructors or [`DistributionSpec::from_json`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dist", rename_all = "UPPERCASE", try_from = "Value")]
pub enum DistributionSpec {
    Fixed { value: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
    Pert { min: f64, mode: f64, max: f64 },
    Lognormal { mu: f64, sigma: f64 },
}

impl DistributionSpec {
    pub fn fixed(value: f64) -> Result<Self> {
        finite("value", value)?;
        Ok(Self::Fixed { value })
    }

    pub fn triangular(min: f64, mode: f64, max: f64) -> Result<Self> {
        check_three_point(min, mode, max)?;
        Ok(Self::Triangular { min, mode, max })
    }

    pub fn pert(min: f64, mode: f64, max: f64) -> Result<Self> {
        check_three_point(min, mode, max)?;
        Ok(Self::Pert { min, mode, max })
    }

    /// `sigma` is floored at sampling time, so any finite value is accepted.
    pub fn lognormal(mu: f64, sigma: f64) -> Result<Self> {
        finite("mu", mu)?;
        finite("sigma", sigma)?;
        Ok(Self::Lognormal { mu, sigma })
    }

    pub fn kind(&self) -> DistributionKind {
        match self {
            Self::Fixed { .. } => DistributionKind::Fixed,
            Self::Triangular { .. } => DistributionKind::Triangular,
            Self::Pert { .. } => DistributionKind::Pert,
            Self::Lognormal { .. } => DistributionKind::Lognormal,
        }
    }

    /// True when every draw returns the same value.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Self::Fixed { .. } => true,
            Self::Triangular { min, max, .. } | Self::Pert { min, max, .. } => max == min,
            Self::Lognormal { .. } => false,
        }
    }

    /// Analytical mean of the distribution.
    pub fn expected_value(&self) -> f64 {
        match *self {
            Self::Fixed { value } => value,
            Self::Triangular { min, mode, max } => (min + mode + max) / 3.0,
            Self::Pert { min, mode, max } => (min + 4.0 * mode + max) / 6.0,
            Self::Lognormal { mu, sigma } => {
                let sigma = sigma.max(crate::sampling::MIN_SIGMA);
                (mu + 0.5 * sigma * sigma).exp()
            }
        }
    }

    /// Parse a loosely-typed JSON spec such as `{"dist": "PERT", "min": 0.1, "ml": 0.3}`.
    ///
    /// Missing or non-numeric fields are defaulted rather than rejected:
    /// `min = 0`, `mode` falls back to `ml` then `min`, `max` falls back to
    /// `max(mode, min)`. A missing tag selects `default_kind`; an empty or
    /// null spec is `Fixed(0.0)`. Unknown tags and inverted bounds are errors.
    pub fn from_json(value: &Value, default_kind: DistributionKind) -> Result<Self> {
        let map = match value {
            Value::Null => return Self::fixed(0.0),
            Value::Number(n) => return Self::fixed(n.as_f64().unwrap_or(0.0)),
            Value::Object(map) if map.is_empty() => return Self::fixed(0.0),
            Value::Object(map) => map,
            other => {
                return Err(ReachError::UnsupportedDistribution {
                    tag: other.to_string(),
                })
            }
        };

        let kind = match map.get("dist") {
            None | Some(Value::Null) => default_kind,
            Some(Value::String(tag)) => DistributionKind::from_tag(tag)
                .ok_or_else(|| ReachError::UnsupportedDistribution { tag: tag.clone() })?,
            Some(other) => {
                return Err(ReachError::UnsupportedDistribution {
                    tag: other.to_string(),
                })
            }
        };

        match kind {
            DistributionKind::Fixed => {
                let value = number(map, "value")
                    .or_else(|| number(map, "mode"))
                    .or_else(|| number(map, "ml"))
                    .unwrap_or(0.0);
                Self::fixed(value)
            }
            DistributionKind::Lognormal => {
                let mu = number(map, "mu").unwrap_or(0.0);
                let sigma = number(map, "sigma").unwrap_or(1.0);
                Self::lognormal(mu, sigma)
            }
            DistributionKind::Triangular | DistributionKind::Pert => {
                let (min, mode, max) = three_point(map);
                if kind == DistributionKind::Pert {
                    Self::pert(min, mode, max)
                } else {
                    Self::triangular(min, mode, max)
                }
            }
        }
    }
}

impl TryFrom<Value> for DistributionSpec {
    type Error = ReachError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_json(&value, DistributionKind::Pert)
    }
}

fn three_point(map: &Map<String, Value>) -> (f64, f64, f64) {
    let min = number(map, "min").unwrap_or(0.0);
    let mode = number(map, "mode")
        .or_else(|| number(map, "ml"))
        .unwrap_or(min);
    let max = number(map, "max").unwrap_or_else(|| mode.max(min));
    (min, mode, max)
}

/// Numbers and numeric strings count; anything else is treated as missing.
fn number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ReachError::NonFiniteParameter { name, value })
    }
}

/// Finite, ordered bounds whose width also fits in an `f64`.
pub(crate) fn check_three_point(min: f64, mode: f64, max: f64) -> Result<()> {
    finite("min", min)?;
    finite("mode", mode)?;
    finite("max", max)?;
    if !(min <= mode && mode <= max) {
        return Err(ReachError::InvalidBounds { min, mode, max });
    }
    finite("max - min", max - min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_fallbacks() {
        let spec = DistributionSpec::from_json(
            &json!({"dist": "pert", "min": 0.1, "ml": 0.3}),
            DistributionKind::Triangular,
        )
        .unwrap();
        assert_eq!(spec, DistributionSpec::Pert { min: 0.1, mode: 0.3, max: 0.3 });

        let spec = DistributionSpec::from_json(&json!({"min": 0.4}), DistributionKind::Triangular).unwrap();
        assert_eq!(spec, DistributionSpec::Triangular { min: 0.4, mode: 0.4, max: 0.4 });
        assert!(spec.is_degenerate());
    }

    #[test]
    fn test_non_numeric_fields_are_defaulted() {
        let spec = DistributionSpec::from_json(
            &json!({"dist": "TRIANGULAR", "min": "abc", "mode": "0.5", "max": [1]}),
            DistributionKind::Pert,
        )
        .unwrap();
        assert_eq!(spec, DistributionSpec::Triangular { min: 0.0, mode: 0.5, max: 0.5 });
    }

    #[test]
    fn test_empty_spec_is_zero() {
        let spec = DistributionSpec::from_json(&json!({}), DistributionKind::Triangular).unwrap();
        assert_eq!(spec, DistributionSpec::Fixed { value: 0.0 });
        let spec = DistributionSpec::from_json(&Value::Null, DistributionKind::Pert).unwrap();
        assert_eq!(spec, DistributionSpec::Fixed { value: 0.0 });
    }

    #[test]
    fn test_fixed_value_fallback() {
        let spec = DistributionSpec::from_json(&json!({"dist": "FIXED", "ml": 0.7}), DistributionKind::Pert).unwrap();
        assert_eq!(spec, DistributionSpec::Fixed { value: 0.7 });
    }

    #[test]
    fn test_unknown_tag() {
        let err = DistributionSpec::from_json(&json!({"dist": "BETA", "alpha": 2.0}), DistributionKind::Pert)
            .unwrap_err();
        assert_eq!(err, ReachError::UnsupportedDistribution { tag: "BETA".to_string() });
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = DistributionSpec::from_json(
            &json!({"dist": "PERT", "min": 0.6, "mode": 0.2, "max": 0.9}),
            DistributionKind::Pert,
        )
        .unwrap_err();
        assert!(matches!(err, ReachError::InvalidBounds { .. }));
        assert!(DistributionSpec::triangular(0.5, 0.5, 0.1).is_err());
        assert!(DistributionSpec::fixed(f64::NAN).is_err());
    }

    #[test]
    fn test_overflowing_width_rejected() {
        let err = DistributionSpec::triangular(-1e308, 1e308, 1e308).unwrap_err();
        assert_eq!(err, ReachError::NonFiniteParameter { name: "max - min", value: f64::INFINITY });

        let err = DistributionSpec::from_json(
            &json!({"dist": "PERT", "min": -1.5e308, "max": 1.5e308}),
            DistributionKind::Pert,
        )
        .unwrap_err();
        assert!(matches!(err, ReachError::NonFiniteParameter { name: "max - min", .. }));
    }

    #[test]
    fn test_serde_tagged_round_trip() {
        let spec = DistributionSpec::pert(0.05, 0.15, 0.35).unwrap();
        let text = serde_json::to_string(&spec).unwrap();
        assert_eq!(text, r#"{"dist":"PERT","min":0.05,"mode":0.15,"max":0.35}"#);
        let back: DistributionSpec = serde_json::from_str(&text).unwrap();
        assert_eq!(back, spec);

        let lognormal: DistributionSpec = serde_json::from_str(r#"{"dist":"LOGNORMAL","mu":12.0}"#).unwrap();
        assert_eq!(lognormal, DistributionSpec::Lognormal { mu: 12.0, sigma: 1.0 });
    }
}
