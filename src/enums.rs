use std::fmt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    ImagePositionPatient,
    TablePosition,
    InstanceNumber,
    None,
}

/// Pixel value units, as given by the _Units_ attribute (0054,1001).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Units {
    /// Becquerels per millilitre
    Bqml,
    /// Raw counts
    Cnts,
    Other(String),
}

impl From<&str> for Units {
    fn from(value: &str) -> Self {
        match value {
            "BQML" => Units::Bqml,
            "CNTS" => Units::Cnts,
            other => Units::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Bqml => f.write_str("BQML"),
            Units::Cnts => f.write_str("CNTS"),
            Units::Other(other) => f.write_str(other),
        }
    }
}

/// Reference time of the decay correction, as given by the
/// _Decay Correction_ attribute (0054,1102).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecayCorrection {
    /// Decay corrected to the acquisition start time
    Start,
    /// Decay corrected to the radiopharmaceutical administration time
    Admin,
    Other(String),
}

impl From<&str> for DecayCorrection {
    fn from(value: &str) -> Self {
        match value {
            "START" => DecayCorrection::Start,
            "ADMIN" => DecayCorrection::Admin,
            other => DecayCorrection::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for DecayCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecayCorrection::Start => f.write_str("START"),
            DecayCorrection::Admin => f.write_str("ADMIN"),
            DecayCorrection::Other(other) => f.write_str(other),
        }
    }
}
