use std::fmt;

use serde::{Deserialize, Serialize};

/// Content class driving model and collection selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
}

impl Modality {
    /// Order in which modalities are queried and their results concatenated.
    pub const PRIORITY: [Modality; 2] = [Modality::Text, Modality::Image];

    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Image => "image",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Modality::Text),
            "image" => Some(Modality::Image),
            _ => None,
        }
    }

    /// Parses every recognised name, silently dropping the rest.
    pub fn parse_all<'a, I>(names: I) -> Vec<Modality>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut modalities = Vec::new();
        for modality in names.into_iter().filter_map(Modality::parse) {
            if !modalities.contains(&modality) {
                modalities.push(modality);
            }
        }
        modalities
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive_and_ignores_unknown() {
        assert_eq!(Modality::parse(" Text "), Some(Modality::Text));
        assert_eq!(Modality::parse("IMAGE"), Some(Modality::Image));
        assert_eq!(Modality::parse("audio"), None);

        let parsed = Modality::parse_all(["image", "audio", "text", "image"]);
        assert_eq!(parsed, vec![Modality::Image, Modality::Text]);
    }
}
