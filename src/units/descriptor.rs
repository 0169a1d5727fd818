//! Unit descriptor text
//!
//! Rendering works on ordered sections of `Key=Value` entries. Parsing is
//! deliberately flat: every `key=value` line of every section lands in one
//! map keyed by the lowercased key, and repeated keys keep the last value.

use std::collections::HashMap;

/// A flat, case-insensitive view of a descriptor file
pub type FlatDescriptor = HashMap<String, String>;

/// One bracketed section, e.g. `[Service]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub header: &'static str,
    pub entries: Vec<(&'static str, String)>,
}

impl Section {
    pub fn new(header: &'static str) -> Self {
        Self {
            header,
            entries: Vec::new(),
        }
    }

    /// Add an entry; empty values are dropped
    pub fn push(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.entries.push((key, value));
        }
    }

    pub fn push_opt(&mut self, key: &'static str, value: Option<&str>) {
        if let Some(v) = value {
            self.push(key, v);
        }
    }
}

/// Render sections in order, blank line between them
///
/// Sections without entries are left out entirely, separator included.
pub fn render(sections: &[Section]) -> String {
    let blocks: Vec<String> = sections
        .iter()
        .filter(|s| !s.entries.is_empty())
        .map(|s| {
            let mut lines = vec![format!("[{}]", s.header)];
            lines.extend(s.entries.iter().map(|(k, v)| format!("{}={}", k, v)));
            lines.join("\n")
        })
        .collect();

    if blocks.is_empty() {
        return String::new();
    }

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

/// Parse descriptor text into a flat key/value map
pub fn parse_flat(content: &str) -> FlatDescriptor {
    let mut entries = FlatDescriptor::new();

    for line in content.lines().map(str::trim) {
        // Skip comments and section headers
        if line.starts_with('#') || line.starts_with(';') || line.starts_with('[') {
            continue;
        }

        let Some((name, value)) = line.split_once('=') else {
            continue;
        };

        let name = name.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        entries.insert(name, value.trim().to_string());
    }

    entries
}
