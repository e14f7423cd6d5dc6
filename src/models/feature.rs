//! The closed enumeration of comparable PII attributes.
//!
//! `Feature` is the vocabulary shared by the normalizer, the skip-value
//! cleaner, the blocking-key extractor and the comparators: every place that
//! needs to say "this attribute of a record" names one of these variants
//! instead of an ad hoc string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A comparable PII attribute.
///
/// `Name` is a convenience covering "first + last" used only by skip-value
/// rules (§4.2); it is never the target of a comparator. `Identifier(Some(t))`
/// denotes a specific HL7 v2 Identifier Type (e.g. `MR`, `SS`, `DL`);
/// `Identifier(None)` is the generic identifier feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String)]
pub enum Feature {
    Birthdate,
    Sex,
    Race,
    GivenName,
    FirstName,
    LastName,
    Name,
    Suffix,
    Address,
    City,
    State,
    Zip,
    County,
    Telecom,
    Phone,
    Email,
    Identifier(Option<String>),
}

impl Feature {
    /// `true` for the convenience feature that only skip-value rules use.
    pub fn is_comparable(&self) -> bool {
        !matches!(self, Feature::Name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Birthdate => write!(f, "BIRTHDATE"),
            Feature::Sex => write!(f, "SEX"),
            Feature::Race => write!(f, "RACE"),
            Feature::GivenName => write!(f, "GIVEN_NAME"),
            Feature::FirstName => write!(f, "FIRST_NAME"),
            Feature::LastName => write!(f, "LAST_NAME"),
            Feature::Name => write!(f, "NAME"),
            Feature::Suffix => write!(f, "SUFFIX"),
            Feature::Address => write!(f, "ADDRESS"),
            Feature::City => write!(f, "CITY"),
            Feature::State => write!(f, "STATE"),
            Feature::Zip => write!(f, "ZIP"),
            Feature::County => write!(f, "COUNTY"),
            Feature::Telecom => write!(f, "TELECOM"),
            Feature::Phone => write!(f, "PHONE"),
            Feature::Email => write!(f, "EMAIL"),
            Feature::Identifier(None) => write!(f, "IDENTIFIER"),
            Feature::Identifier(Some(t)) => write!(f, "IDENTIFIER:{t}"),
        }
    }
}

impl std::str::FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(typecode) = s.strip_prefix("IDENTIFIER:") {
            if typecode.is_empty() {
                return Err(format!("empty identifier typecode in feature '{s}'"));
            }
            return Ok(Feature::Identifier(Some(typecode.to_string())));
        }
        match s {
            "BIRTHDATE" => Ok(Feature::Birthdate),
            "SEX" => Ok(Feature::Sex),
            "RACE" => Ok(Feature::Race),
            "GIVEN_NAME" => Ok(Feature::GivenName),
            "FIRST_NAME" => Ok(Feature::FirstName),
            "LAST_NAME" => Ok(Feature::LastName),
            "NAME" => Ok(Feature::Name),
            "SUFFIX" => Ok(Feature::Suffix),
            "ADDRESS" => Ok(Feature::Address),
            "CITY" => Ok(Feature::City),
            "STATE" => Ok(Feature::State),
            "ZIP" => Ok(Feature::Zip),
            "COUNTY" => Ok(Feature::County),
            "TELECOM" => Ok(Feature::Telecom),
            "PHONE" => Ok(Feature::Phone),
            "EMAIL" => Ok(Feature::Email),
            "IDENTIFIER" => Ok(Feature::Identifier(None)),
            other => Err(format!("unknown feature '{other}'")),
        }
    }
}

impl TryFrom<String> for Feature {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Feature> for String {
    fn from(value: Feature) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_plain_features() {
        for f in [
            Feature::Birthdate,
            Feature::Sex,
            Feature::Race,
            Feature::GivenName,
            Feature::FirstName,
            Feature::LastName,
            Feature::Name,
            Feature::Suffix,
            Feature::Address,
            Feature::City,
            Feature::State,
            Feature::Zip,
            Feature::County,
            Feature::Telecom,
            Feature::Phone,
            Feature::Email,
            Feature::Identifier(None),
        ] {
            let s = f.to_string();
            assert_eq!(s.parse::<Feature>().unwrap(), f);
        }
    }

    #[test]
    fn round_trips_typed_identifier() {
        let f = Feature::Identifier(Some("MR".to_string()));
        assert_eq!(f.to_string(), "IDENTIFIER:MR");
        assert_eq!("IDENTIFIER:MR".parse::<Feature>().unwrap(), f);
    }

    #[test]
    fn rejects_unknown_feature() {
        assert!("NOT_A_FEATURE".parse::<Feature>().is_err());
        assert!("IDENTIFIER:".parse::<Feature>().is_err());
    }
}
