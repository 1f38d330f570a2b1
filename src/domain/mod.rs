//! Domain types for the reconciliation engine with strong typing.
//!
//! Record identifiers are wrapped in newtypes so a releaser ID can never be
//! passed where a production ID or an external archive ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }
    };
}

record_id!(
    /// Primary key of a local releaser (person or group).
    ReleaserId
);
record_id!(
    /// Primary key of a local production.
    ProductionId
);
record_id!(NickId);
record_id!(
    /// Identifier of a record in the Janeway archive, as stored in
    /// cross-link parameters.
    JanewayId
);

impl JanewayId {
    /// Parses a cross-link parameter. Parameters are stored as text.
    pub fn from_parameter(parameter: &str) -> Option<Self> {
        parameter.trim().parse::<i32>().ok().map(Self::new)
    }

    #[must_use]
    pub fn to_parameter(&self) -> String {
        self.0.to_string()
    }
}

/// Broad category of a production. Matching never pairs records across
/// supertypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Supertype {
    Production,
    Music,
    Graphics,
}

impl Supertype {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Music => "music",
            Self::Graphics => "graphics",
        }
    }
}

impl fmt::Display for Supertype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Supertype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Self::Production),
            "music" => Ok(Self::Music),
            "graphics" => Ok(Self::Graphics),
            other => Err(format!("Unknown production supertype: {other}")),
        }
    }
}

/// Kinds of cross-links into the Janeway archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// Releaser → Janeway author.
    KestraBitworldAuthor,
    /// Production → Janeway release.
    KestraBitworldRelease,
}

impl LinkClass {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::KestraBitworldAuthor => "KestraBitworldAuthor",
            Self::KestraBitworldRelease => "KestraBitworldRelease",
        }
    }
}

impl fmt::Display for LinkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releaser_id_conversions() {
        let id = ReleaserId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(ReleaserId::from(42), id);
    }

    #[test]
    fn janeway_id_parameter_round_trip() {
        let id = JanewayId::new(1234);
        assert_eq!(id.to_parameter(), "1234");
        assert_eq!(JanewayId::from_parameter("1234"), Some(id));
        assert_eq!(JanewayId::from_parameter(" 77 "), Some(JanewayId::new(77)));
        assert_eq!(JanewayId::from_parameter("abc"), None);
    }

    #[test]
    fn supertype_parses_known_values_only() {
        assert_eq!("music".parse::<Supertype>(), Ok(Supertype::Music));
        assert_eq!(Supertype::Graphics.to_string(), "graphics");
        assert!("demo".parse::<Supertype>().is_err());
    }

    #[test]
    fn id_serializes_as_plain_number() {
        let json = serde_json::to_string(&ProductionId::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: ProductionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ProductionId::new(9));
    }
}
