use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Metal codes the engine quotes (ISO 4217 precious-metal codes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetalCode {
    /// Gold
    #[serde(rename = "XAU")]
    Xau,
    /// Silver
    #[serde(rename = "XAG")]
    Xag,
}

/// Returned when a string is not a supported metal code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown metal code: {0}")]
pub struct UnknownMetalCode(pub String);

impl MetalCode {
    /// All supported metals, in display order.
    pub const ALL: [MetalCode; 2] = [MetalCode::Xau, MetalCode::Xag];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetalCode::Xau => "XAU",
            MetalCode::Xag => "XAG",
        }
    }
}

impl fmt::Display for MetalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetalCode {
    type Err = UnknownMetalCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "XAU" => Ok(MetalCode::Xau),
            "XAG" => Ok(MetalCode::Xag),
            other => Err(UnknownMetalCode(other.to_string())),
        }
    }
}

/// Semantic class of a price feed.
///
/// "Market" feeds track the wholesale/spot price; "retail" feeds track the
/// consumer/reference price. Each adapter declares its lane; the reducer
/// only ever mixes quotes from the same lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceLane {
    Market,
    Retail,
}

impl PriceLane {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceLane::Market => "market",
            PriceLane::Retail => "retail",
        }
    }

    /// The opposite lane, used by the synthesizer.
    pub fn other(&self) -> PriceLane {
        match self {
            PriceLane::Market => PriceLane::Retail,
            PriceLane::Retail => PriceLane::Market,
        }
    }
}

impl fmt::Display for PriceLane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metal_code_round_trip() {
        for metal in MetalCode::ALL {
            assert_eq!(metal.as_str().parse::<MetalCode>().unwrap(), metal);
        }
    }

    #[test]
    fn test_metal_code_rejects_unknown() {
        assert!("XPT".parse::<MetalCode>().is_err());
        assert!("xau".parse::<MetalCode>().is_err());
        assert!("".parse::<MetalCode>().is_err());
    }

    #[test]
    fn test_metal_code_serde_uses_iso_codes() {
        assert_eq!(serde_json::to_string(&MetalCode::Xau).unwrap(), "\"XAU\"");
        assert_eq!(
            serde_json::from_str::<MetalCode>("\"XAG\"").unwrap(),
            MetalCode::Xag
        );
    }

    #[test]
    fn test_lane_other() {
        assert_eq!(PriceLane::Market.other(), PriceLane::Retail);
        assert_eq!(PriceLane::Retail.other(), PriceLane::Market);
    }

    #[test]
    fn test_lane_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&PriceLane::Market).unwrap(),
            "\"market\""
        );
    }
}
