//! # Level of Assurance & Identification Status
//!
//! `LevelOfAssurance` travels as a URI string. `null`, a missing field, and
//! the literal `"unknown"` all read as [`LevelOfAssurance::Unknown`], and
//! `Unknown` is left out when a report is written, so the three inputs
//! produce the same output.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How strongly the subject's identity was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LevelOfAssurance {
    /// eIDAS notified scheme, level high.
    EidasHigh,
    /// eIDAS notified scheme, level substantial.
    EidasSubstantial,
    /// eIDAS notified scheme, level low.
    EidasLow,
    /// Non-notified scheme, level high.
    EidasNotNotifiedHigh,
    /// Non-notified scheme, level substantial.
    EidasNotNotifiedSubstantial,
    /// Non-notified scheme, level low.
    EidasNotNotifiedLow,
    /// BSI TR-03107-1 level "hoch".
    BsiEidHigh,
    /// BSI TR-03107-1 level "substantiell".
    BsiEidSubstantial,
    /// BSI TR-03107-1 level "normal".
    BsiEidLow,
    /// No level stated.
    #[default]
    Unknown,
}

impl LevelOfAssurance {
    /// Every level, `Unknown` last.
    pub const ALL: [Self; 10] = [
        Self::EidasHigh,
        Self::EidasSubstantial,
        Self::EidasLow,
        Self::EidasNotNotifiedHigh,
        Self::EidasNotNotifiedSubstantial,
        Self::EidasNotNotifiedLow,
        Self::BsiEidHigh,
        Self::BsiEidSubstantial,
        Self::BsiEidLow,
        Self::Unknown,
    ];

    /// The wire value.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::EidasHigh => "http://eidas.europa.eu/LoA/high",
            Self::EidasSubstantial => "http://eidas.europa.eu/LoA/substantial",
            Self::EidasLow => "http://eidas.europa.eu/LoA/low",
            Self::EidasNotNotifiedHigh => "http://eidas.europa.eu/NotNotified/LoA/high",
            Self::EidasNotNotifiedSubstantial => "http://eidas.europa.eu/NotNotified/LoA/substantial",
            Self::EidasNotNotifiedLow => "http://eidas.europa.eu/NotNotified/LoA/low",
            Self::BsiEidHigh => "http://bsi.bund.de/eID/LoA/hoch",
            Self::BsiEidSubstantial => "http://bsi.bund.de/eID/LoA/substantiell",
            Self::BsiEidLow => "http://bsi.bund.de/eID/LoA/normal",
            Self::Unknown => "unknown",
        }
    }

    /// Look up a level by its wire value.
    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.uri() == uri)
    }

    /// True for [`LevelOfAssurance::Unknown`].
    pub fn is_unknown(&self) -> bool {
        *self == Self::Unknown
    }
}

impl std::fmt::Display for LevelOfAssurance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.uri())
    }
}

impl Serialize for LevelOfAssurance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.uri())
    }
}

impl<'de> Deserialize<'de> for LevelOfAssurance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Self::Unknown),
            Some(uri) => Self::from_uri(&uri).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown level of assurance '{uri}'"))
            }),
        }
    }
}

/// Outcome of the identification process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdStatus {
    /// Identification succeeded.
    Success,
    /// Identification finished with missing data.
    Incomplete,
    /// Identification failed; the reason is in `idStatement`.
    Failure,
    /// Outcome not known.
    Unknown,
}
