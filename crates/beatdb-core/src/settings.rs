use serde::{Deserialize, Serialize};

/// Settings key holding the store data visibility flag.
pub const DATA_VISIBILITY_KEY: &str = "dataVisibility";

/// Whether store data should be exposed to consuming UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataVisibility {
    Visible,
    Hidden,
}

impl DataVisibility {
    /// Derive visibility from the stored setting value.
    ///
    /// Only the literal `hidden` hides data; a missing row or any other value
    /// leaves data visible.
    #[must_use]
    pub fn from_setting(value: Option<&str>) -> Self {
        match value {
            Some("hidden") => Self::Hidden,
            _ => Self::Visible,
        }
    }

    #[must_use]
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        }
    }
}

impl std::fmt::Display for DataVisibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DataVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visible" => Ok(Self::Visible),
            "hidden" => Ok(Self::Hidden),
            other => Err(format!(
                "visibility must be 'visible' or 'hidden', got '{other}'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_setting_is_visible() {
        assert_eq!(DataVisibility::from_setting(None), DataVisibility::Visible);
    }

    #[test]
    fn only_hidden_hides() {
        assert_eq!(
            DataVisibility::from_setting(Some("hidden")),
            DataVisibility::Hidden
        );
        assert!(DataVisibility::from_setting(Some("visible")).is_visible());
        assert!(DataVisibility::from_setting(Some("")).is_visible());
    }

    #[test]
    fn from_str_accepts_mixed_case() {
        assert_eq!(
            " Hidden ".parse::<DataVisibility>(),
            Ok(DataVisibility::Hidden)
        );
        assert!("maybe".parse::<DataVisibility>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&DataVisibility::Hidden).expect("serialize");
        assert_eq!(json, "\"hidden\"");
    }
}
