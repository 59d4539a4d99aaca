//! Parser for station `.config` files.
//!
//! The capture software writes an INI dialect:
//!
//! ```text
//! [System]
//! stationID: HR0001
//! latitude: 45.815 ; WGS84 +N (degrees)
//! longitude = 15.979 ; WGS84 +E (degrees)
//! ```
//!
//! Keys are case-insensitive, `=` and `:` both separate key from value,
//! whole lines starting with `#` or `;` are comments, and `;` preceded by
//! whitespace starts an inline comment. Indented lines continue the
//! previous value.

use std::collections::BTreeMap;
use std::io::Read;

/// Errors from reading a station config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    /// File could not be read
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// A key appeared before any `[Section]` header
    #[error("line {line}: key outside of any section")]
    MissingSectionHeader { line: usize },

    /// A line is neither a header, comment, nor `key = value`
    #[error("line {line}: cannot parse {text:?}")]
    Syntax { line: usize, text: String },

    /// A required key is absent
    #[error("missing [{section}] {key}")]
    MissingKey { section: String, key: String },
}

/// A parsed config file: sections of lowercase keys to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl ConfigFile {
    /// Read and parse a whole config file.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, ConfigFileError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::parse(&String::from_utf8_lossy(&bytes))
    }

    /// Parse config text.
    ///
    /// Repeated sections merge and repeated keys keep the last value.
    pub fn parse(text: &str) -> Result<Self, ConfigFileError> {
        let mut sections: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        let mut section: Option<String> = None;
        let mut last_key: Option<String> = None;

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = strip_inline_comment(raw);
            let trimmed = line.trim();

            if trimmed.is_empty() || raw.trim_start().starts_with(['#', ';']) {
                continue;
            }

            let indented = line.starts_with([' ', '\t']);
            if indented && let (Some(sec), Some(key)) = (&section, &last_key) {
                if let Some(value) = sections.get_mut(sec).and_then(|s| s.get_mut(key)) {
                    value.push('\n');
                    value.push_str(trimmed);
                }
                continue;
            }

            if let Some(name) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                let name = name.trim().to_string();
                sections.entry(name.clone()).or_default();
                section = Some(name);
                last_key = None;
                continue;
            }

            let Some(split) = trimmed.find(['=', ':']) else {
                return Err(ConfigFileError::Syntax {
                    line: line_no,
                    text: raw.to_string(),
                });
            };
            let key = trimmed[..split].trim().to_lowercase();
            if key.is_empty() {
                return Err(ConfigFileError::Syntax {
                    line: line_no,
                    text: raw.to_string(),
                });
            }
            let value = trimmed[split + 1..].trim().to_string();

            let Some(sec) = &section else {
                return Err(ConfigFileError::MissingSectionHeader { line: line_no });
            };
            sections.entry(sec.clone()).or_default().insert(key.clone(), value);
            last_key = Some(key);
        }

        Ok(Self { sections })
    }

    /// Look up a value. Section names are case-sensitive, keys are not.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)?
            .get(&key.to_lowercase())
            .map(String::as_str)
    }

    /// Look up a value that must be present.
    pub fn require(&self, section: &str, key: &str) -> Result<&str, ConfigFileError> {
        self.get(section, key)
            .ok_or_else(|| ConfigFileError::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    /// Check whether a section exists.
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }
}

/// Cut a line at the first `;` that follows whitespace.
fn strip_inline_comment(line: &str) -> &str {
    let mut prev_ws = false;
    for (i, c) in line.char_indices() {
        if c == ';' && prev_ws {
            return &line[..i];
        }
        prev_ws = c.is_whitespace();
    }
    line
}
