//! Regulatory data sources
//!
//! Every source record and every alert is tagged with the registry it came
//! from. Collaborators hand us source tags as free-form strings (scrapers,
//! API clients, cached payloads written by older versions), so normalization
//! is lenient: unknown or legacy spellings map to `Unknown` rather than
//! failing.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A regulatory registry that can supply records about an individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    FinraBrokerCheck,
    Iapd,
    FinraDisciplinary,
    SecDisciplinary,
    FinraArbitration,
    SecArbitration,
    NfaRegulatory,
    Unknown,
}

impl DataSource {
    /// Canonical display name used in report `source` fields.
    pub fn display_name(&self) -> &'static str {
        match self {
            DataSource::FinraBrokerCheck => "FINRA_BrokerCheck",
            DataSource::Iapd => "IAPD",
            DataSource::FinraDisciplinary => "FINRA_Disciplinary",
            DataSource::SecDisciplinary => "SEC_Disciplinary",
            DataSource::FinraArbitration => "FINRA_Arbitration",
            DataSource::SecArbitration => "SEC_Arbitration",
            DataSource::NfaRegulatory => "NFA_Regulatory",
            DataSource::Unknown => "Unknown",
        }
    }

    /// Normalize a collaborator-supplied source tag.
    ///
    /// Case-insensitive and separator-tolerant: `"FINRA_BrokerCheck"`,
    /// `"finra brokercheck"` and `"FinraBrokerCheck"` all resolve to the
    /// same variant. Anything unrecognized maps to `Unknown`.
    pub fn normalize(raw: &str) -> Self {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "finrabrokercheck" | "brokercheck" | "bc" => DataSource::FinraBrokerCheck,
            "iapd" | "seciapd" | "adviserinfo" => DataSource::Iapd,
            "finradisciplinary" | "finradisc" => DataSource::FinraDisciplinary,
            "secdisciplinary" | "secdisc" => DataSource::SecDisciplinary,
            "finraarbitration" | "finraarb" => DataSource::FinraArbitration,
            "secarbitration" | "secarb" => DataSource::SecArbitration,
            "nfaregulatory" | "nfa" | "nfabasic" => DataSource::NfaRegulatory,
            _ => DataSource::Unknown,
        }
    }

    /// True for the registries that carry the individual's identity profile
    /// (name, scopes, exams, employments, disclosures).
    pub fn is_identity_source(&self) -> bool {
        matches!(self, DataSource::FinraBrokerCheck | DataSource::Iapd)
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Unknown
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// Serialized as the canonical display name; deserialization accepts any
// spelling a collaborator may have written, through `normalize`. Cached
// payloads from older pipeline versions must stay readable.
impl Serialize for DataSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

impl<'de> Deserialize<'de> for DataSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(DataSource::normalize(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_spellings() {
        assert_eq!(
            DataSource::normalize("FINRA_BrokerCheck"),
            DataSource::FinraBrokerCheck
        );
        assert_eq!(
            DataSource::normalize("finra brokercheck"),
            DataSource::FinraBrokerCheck
        );
        assert_eq!(DataSource::normalize("IAPD"), DataSource::Iapd);
        assert_eq!(DataSource::normalize("nfa"), DataSource::NfaRegulatory);
        assert_eq!(
            DataSource::normalize("SEC-Arbitration"),
            DataSource::SecArbitration
        );
    }

    #[test]
    fn test_normalize_unknown_falls_back() {
        assert_eq!(DataSource::normalize("legacy_scraper_v1"), DataSource::Unknown);
        assert_eq!(DataSource::normalize(""), DataSource::Unknown);
    }

    #[test]
    fn test_display_round_trip() {
        for source in [
            DataSource::FinraBrokerCheck,
            DataSource::Iapd,
            DataSource::FinraDisciplinary,
            DataSource::SecDisciplinary,
            DataSource::FinraArbitration,
            DataSource::SecArbitration,
            DataSource::NfaRegulatory,
        ] {
            assert_eq!(DataSource::normalize(source.display_name()), source);
        }
    }

    #[test]
    fn test_serde_uses_display_names_and_lenient_parsing() {
        let json = serde_json::to_string(&DataSource::FinraBrokerCheck).unwrap();
        assert_eq!(json, "\"FINRA_BrokerCheck\"");

        let back: DataSource = serde_json::from_str("\"finra brokercheck\"").unwrap();
        assert_eq!(back, DataSource::FinraBrokerCheck);

        // Legacy tags from older cached payloads degrade instead of failing
        let legacy: DataSource = serde_json::from_str("\"legacy_scraper_v1\"").unwrap();
        assert_eq!(legacy, DataSource::Unknown);
    }

    #[test]
    fn test_identity_sources() {
        assert!(DataSource::FinraBrokerCheck.is_identity_source());
        assert!(DataSource::Iapd.is_identity_source());
        assert!(!DataSource::FinraDisciplinary.is_identity_source());
    }
}
