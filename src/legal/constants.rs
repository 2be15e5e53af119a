//! Closed selection lists exposed to operators.
//!
//! These mirror the selection options a law office actually files under:
//! preferred language, corporate entity type, sex, the role a party plays in
//! a case, and the case type. Database values are stable snake_case strings.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Preferred communication language for a client or contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    En,
    Fr,
    Other,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::En => "en",
            Self::Fr => "fr",
            Self::Other => "other",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "ar" => Some(Self::Ar),
            "en" => Some(Self::En),
            "fr" => Some(Self::Fr),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ar => "Arabic",
            Self::En => "English",
            Self::Fr => "French",
            Self::Other => "Other",
        }
    }
}

/// Corporate form of an entity client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Llc,
    Jsc,
    Partnership,
    Other,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Llc => "llc",
            Self::Jsc => "jsc",
            Self::Partnership => "partnership",
            Self::Other => "other",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "llc" => Some(Self::Llc),
            "jsc" => Some(Self::Jsc),
            "partnership" => Some(Self::Partnership),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Llc => "LLC",
            Self::Jsc => "JSC",
            Self::Partnership => "Partnership",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Role a party plays in a case, used for both the client and the opponent
/// (plaintiff, defendant, third party, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PartyStatus {
    Plaintiff,
    Defendant,
    ThirdParty,
    Witness,
    Other,
}

impl PartyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plaintiff => "plaintiff",
            Self::Defendant => "defendant",
            Self::ThirdParty => "third_party",
            Self::Witness => "witness",
            Self::Other => "other",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "plaintiff" => Some(Self::Plaintiff),
            "defendant" => Some(Self::Defendant),
            "third_party" => Some(Self::ThirdParty),
            "witness" => Some(Self::Witness),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Plaintiff => "Plaintiff",
            Self::Defendant => "Defendant",
            Self::ThirdParty => "Third Party",
            Self::Witness => "Witness",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaseType {
    Civil,
    Criminal,
    Commercial,
    Family,
    Administrative,
    Other,
}

impl CaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Civil => "civil",
            Self::Criminal => "criminal",
            Self::Commercial => "commercial",
            Self::Family => "family",
            Self::Administrative => "administrative",
            Self::Other => "other",
        }
    }

    pub fn from_db_value(value: &str) -> Option<Self> {
        match value {
            "civil" => Some(Self::Civil),
            "criminal" => Some(Self::Criminal),
            "commercial" => Some(Self::Commercial),
            "family" => Some(Self::Family),
            "administrative" => Some(Self::Administrative),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Civil => "Civil",
            Self::Criminal => "Criminal",
            Self::Commercial => "Commercial",
            Self::Family => "Family",
            Self::Administrative => "Administrative",
            Self::Other => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn party_status_db_values_round_trip() {
        for status in [
            PartyStatus::Plaintiff,
            PartyStatus::Defendant,
            PartyStatus::ThirdParty,
            PartyStatus::Witness,
            PartyStatus::Other,
        ] {
            assert_eq!(PartyStatus::from_db_value(status.as_str()), Some(status));
        }
        assert_eq!(PartyStatus::from_db_value("appellant"), None);
    }

    #[test]
    fn unknown_db_values_are_rejected_not_coerced() {
        assert_eq!(Language::from_db_value("de"), None);
        assert_eq!(CaseType::from_db_value(""), None);
        assert_eq!(EntityType::from_db_value("LLC"), None);
    }
}
