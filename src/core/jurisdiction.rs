//! Taxing jurisdiction levels and their AFIP codes.

use std::str::FromStr;

/// Level of the authority that levies a perception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Jurisdiction {
    /// Nacional (AFIP).
    National,
    /// Provincial (Ingresos Brutos, one per province).
    Provincial,
    /// Municipal (tasas municipales).
    Municipal,
}

impl Jurisdiction {
    /// Stored value of the jurisdiction, as hosts persist it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::National => "nacional",
            Self::Provincial => "provincial",
            Self::Municipal => "municipal",
        }
    }

    /// Tribute code used by the AFIP electronic invoicing service.
    pub fn afip_code(&self) -> &'static str {
        match self {
            Self::National => "1",
            Self::Provincial => "2",
            Self::Municipal => "3",
        }
    }

    /// Parse a stored jurisdiction value. Accepts the Spanish storage keys
    /// and their English names.
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "nacional" | "national" => Some(Self::National),
            "provincial" => Some(Self::Provincial),
            "municipal" => Some(Self::Municipal),
            _ => None,
        }
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a jurisdiction value is not one of the three levels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown jurisdiction '{0}'")]
pub struct ParseJurisdictionError(pub String);

impl FromStr for Jurisdiction {
    type Err = ParseJurisdictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_value(s).ok_or_else(|| ParseJurisdictionError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn afip_codes() {
        assert_eq!(Jurisdiction::National.afip_code(), "1");
        assert_eq!(Jurisdiction::Provincial.afip_code(), "2");
        assert_eq!(Jurisdiction::Municipal.afip_code(), "3");
    }

    #[test]
    fn parse_stored_values() {
        assert_eq!("nacional".parse(), Ok(Jurisdiction::National));
        assert_eq!("national".parse(), Ok(Jurisdiction::National));
        assert_eq!("provincial".parse(), Ok(Jurisdiction::Provincial));
        assert_eq!("municipal".parse(), Ok(Jurisdiction::Municipal));
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("".parse::<Jurisdiction>().is_err());
        assert!("federal".parse::<Jurisdiction>().is_err());
        assert!("Provincial".parse::<Jurisdiction>().is_err());
    }

    #[test]
    fn as_str_round_trips() {
        for j in [
            Jurisdiction::National,
            Jurisdiction::Provincial,
            Jurisdiction::Municipal,
        ] {
            assert_eq!(Jurisdiction::from_value(j.as_str()), Some(j));
        }
    }
}
