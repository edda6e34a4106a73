//! Domain vocabulary: FIRES elements and the four zones.
//!
//! Both enums are parsed case-insensitively because upstream rows carry
//! free-cased labels (`"Discovering"`, `"FEELINGS"`). Unknown labels are a
//! parse failure — callers decide whether to quarantine or reject.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the five FIRES levers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FiresElement {
    /// Emotional awareness and regulation.
    Feelings,
    /// Locus of control and agency.
    Influence,
    /// Growth through difficulty.
    Resilience,
    /// Values alignment and purpose.
    Ethics,
    /// Capability confidence and self-efficacy.
    Strengths,
}

impl FiresElement {
    /// Lowercase wire label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feelings => "feelings",
            Self::Influence => "influence",
            Self::Resilience => "resilience",
            Self::Ethics => "ethics",
            Self::Strengths => "strengths",
        }
    }
}

impl fmt::Display for FiresElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FiresElement {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "feelings" => Ok(Self::Feelings),
            "influence" => Ok(Self::Influence),
            "resilience" => Ok(Self::Resilience),
            "ethics" => Ok(Self::Ethics),
            "strengths" => Ok(Self::Strengths),
            _ => Err(()),
        }
    }
}

/// One of the four zones from the FIRES snapshot
/// (confidence × alignment quadrants).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Low confidence, low alignment: stay curious, refine direction.
    Exploring,
    /// Low confidence, high alignment: bring forward past wins.
    Discovering,
    /// High confidence, low alignment: reconnect to identity.
    Performing,
    /// High confidence, high alignment: extend influence to others.
    Owning,
}

impl Zone {
    /// Lowercase wire label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exploring => "exploring",
            Self::Discovering => "discovering",
            Self::Performing => "performing",
            Self::Owning => "owning",
        }
    }

    /// Parse a free-cased label, returning `None` for unknown values.
    ///
    /// Used at row-decode time to quarantine bad zone labels rather than
    /// failing the whole read.
    #[must_use]
    pub fn parse_lossy(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exploring" => Ok(Self::Exploring),
            "discovering" => Ok(Self::Discovering),
            "performing" => Ok(Self::Performing),
            "owning" => Ok(Self::Owning),
            _ => Err(()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
