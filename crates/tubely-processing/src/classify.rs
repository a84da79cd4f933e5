use crate::probe::ProbeResult;
use std::fmt;

/// Orientation bucket used as the storage key prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrientationClass {
    Landscape,
    Portrait,
    Other,
}

impl OrientationClass {
    /// Exact match on `16:9` / `9:16`; every other ratio, including none, is `Other`.
    pub fn classify(display_aspect_ratio: &str) -> Self {
        match display_aspect_ratio {
            "16:9" => OrientationClass::Landscape,
            "9:16" => OrientationClass::Portrait,
            _ => OrientationClass::Other,
        }
    }

    pub fn from_probe(probe: &ProbeResult) -> Self {
        probe
            .display_aspect_ratio
            .as_deref()
            .map(Self::classify)
            .unwrap_or(OrientationClass::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrientationClass::Landscape => "landscape",
            OrientationClass::Portrait => "portrait",
            OrientationClass::Other => "other",
        }
    }
}

impl fmt::Display for OrientationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
