use std::fmt;

/// The on-disk encoding of a component's source file (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Yaml,
    Csv,
    Cbor,
    Xlsx,
    Md,
    Html,
    Star,
}

impl Format {
    /// Normalized extension string, e.g. for building a canonical filename.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Csv => "csv",
            Format::Cbor => "cbor",
            Format::Xlsx => "xlsx",
            Format::Md => "md",
            Format::Html => "html",
            Format::Star => "star",
        }
    }

    pub fn from_normalized_extension(ext: &str) -> Option<Format> {
        match ext {
            "json" => Some(Format::Json),
            "yaml" => Some(Format::Yaml),
            "csv" => Some(Format::Csv),
            "cbor" => Some(Format::Cbor),
            "xlsx" => Some(Format::Xlsx),
            "md" => Some(Format::Md),
            "html" => Some(Format::Html),
            "star" => Some(Format::Star),
            _ => None,
        }
    }

    /// Whether this format's component bodies are loaded as raw text/bytes
    /// (`ScriptBytes`) rather than parsed into a JSON tree (§4.D).
    pub fn is_script(&self) -> bool {
        matches!(self, Format::Md | Format::Html | Format::Star)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Strip a leading dot and fold `yml` to `yaml` (§4.B).
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.strip_prefix('.').unwrap_or(ext).to_lowercase();
    if ext == "yml" {
        "yaml".to_string()
    } else {
        ext
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yml_normalizes_to_yaml() {
        assert_eq!(normalize_extension("yml"), "yaml");
        assert_eq!(normalize_extension(".YML"), "yaml");
    }

    #[test]
    fn leading_dot_is_stripped() {
        assert_eq!(normalize_extension(".json"), "json");
    }
}
