//! Minimal INI document parser.
//!
//! Supports the subset used by `gpio.conf`:
//!
//! ```ini
//! ; comment
//! [Section]
//! key = value
//! other: value
//! ```
//!
//! Section names are case-sensitive, keys are not. Keys keep file order,
//! which drives pin processing order.

use crate::config::ConfigError;

/// A single `[Section]` with its key/value pairs in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    name: String,
    entries: Vec<(String, String)>,
}

impl IniSection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    /// Section name as written in the header.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a value by key, ignoring ASCII case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(key, value)` pairs in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the section has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parsed INI document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<IniSection>,
}

impl IniDocument {
    /// Parse INI text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` (with the 1-based line number) for:
    /// - a key/value line before the first section header
    /// - a line that is neither header, comment nor `key=value` / `key: value`
    /// - an empty section name or key
    /// - a duplicate section, or a duplicate key within one section
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut doc = IniDocument::default();

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let Some(name) = header.strip_suffix(']') else {
                    return Err(parse_error(line_no, "unterminated section header"));
                };
                let name = name.trim();
                if name.is_empty() {
                    return Err(parse_error(line_no, "empty section name"));
                }
                if doc.section(name).is_some() {
                    return Err(parse_error(line_no, format!("duplicate section '{name}'")));
                }
                doc.sections.push(IniSection::new(name));
                continue;
            }

            let Some(split) = line.find(['=', ':']) else {
                return Err(parse_error(
                    line_no,
                    format!("expected 'key=value', got '{line}'"),
                ));
            };
            let key = line[..split].trim();
            let value = line[split + 1..].trim();

            if key.is_empty() {
                return Err(parse_error(line_no, "empty key"));
            }

            let Some(section) = doc.sections.last_mut() else {
                return Err(parse_error(
                    line_no,
                    format!("key '{key}' appears before any section header"),
                ));
            };
            if section.get(key).is_some() {
                return Err(parse_error(
                    line_no,
                    format!("duplicate key '{key}' in section '{}'", section.name),
                ));
            }
            section.entries.push((key.to_string(), value.to_string()));
        }

        Ok(doc)
    }

    /// Look up a section by exact name.
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> ConfigError {
    ConfigError::ParseError {
        line,
        message: message.into(),
    }
}
