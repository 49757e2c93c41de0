//! Minimal ordered INI model matching what the dedicated server reads.
//!
//! Keys are case-sensitive and keep insertion order. Pairs are written as
//! `KEY=value` with no padding around the `=`.

use std::fmt::{self, Write};

use crate::roster::Entry;
use crate::{EntryListError, Result};

const FREE_ENTRY: &str = "Free entry";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IniLine {
    Comment(String),
    Pair(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniSection {
    pub name: String,
    pub lines: Vec<IniLine>,
}

impl IniSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    pub fn comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(IniLine::Comment(text.into()));
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.lines.push(IniLine::Pair(key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            IniLine::Pair(k, v) if k == key => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            IniLine::Pair(k, v) => Some((k.as_str(), v.as_str())),
            IniLine::Comment(_) => None,
        })
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| match line {
            IniLine::Comment(c) => Some(c.as_str()),
            IniLine::Pair(..) => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    pub sections: Vec<IniSection>,
}

impl IniDocument {
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut doc = IniDocument::default();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                doc.sections.push(IniSection::new(name));
                continue;
            }

            let section = doc.sections.last_mut().ok_or_else(|| {
                EntryListError::InvalidIni {
                    line: idx + 1,
                    reason: "content before first section".to_string(),
                }
            })?;

            if let Some(comment) = line.strip_prefix(';').or_else(|| line.strip_prefix('#')) {
                section.comment(comment.trim_start());
            } else if let Some((key, value)) = line.split_once('=') {
                section.set(key.trim(), value.trim());
            } else {
                return Err(EntryListError::InvalidIni {
                    line: idx + 1,
                    reason: format!("expected KEY=value, got {line:?}"),
                });
            }
        }

        Ok(doc)
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            writeln!(f, "[{}]", section.name)?;
            for line in &section.lines {
                match line {
                    IniLine::Comment(text) => writeln!(f, "; {text}")?,
                    IniLine::Pair(key, value) => writeln!(f, "{key}={value}")?,
                }
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

/// Builds the `entry_list.ini` document, one `CAR_<n>` section per slot.
pub fn entry_list_document(entries: &[Entry]) -> IniDocument {
    let sections = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let mut section = IniSection::new(format!("CAR_{idx}"));
            section
                .comment(entry.name.as_deref().unwrap_or(FREE_ENTRY))
                .set("MODEL", entry.car.as_deref().unwrap_or_default())
                .set("SKIN", entry.skin.as_deref().unwrap_or_default())
                .set("SPECTATOR_MODE", "0")
                .set("DRIVERNAME", "")
                .set("TEAM", "")
                .set("GUID", entry.identity_id.as_deref().unwrap_or_default())
                .set("BALLAST", "0")
                .set("RESTRICTOR", "0");
            section
        })
        .collect();

    IniDocument { sections }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Entry {
        Entry {
            name: Some("Jane Doe".to_string()),
            roster_id: Some("12345".to_string()),
            identity_id: None,
            car: Some("ks_ferrari_488_gt3".to_string()),
            skin: Some("00_official".to_string()),
        }
    }

    #[test]
    fn renders_server_layout() {
        let text = entry_list_document(&[jane()]).to_string();
        assert_eq!(
            text,
            "[CAR_0]\n\
             ; Jane Doe\n\
             MODEL=ks_ferrari_488_gt3\n\
             SKIN=00_official\n\
             SPECTATOR_MODE=0\n\
             DRIVERNAME=\n\
             TEAM=\n\
             GUID=\n\
             BALLAST=0\n\
             RESTRICTOR=0\n\
             \n"
        );
    }

    #[test]
    fn nameless_entries_are_free() {
        let mut free = jane();
        free.name = None;
        free.identity_id = Some("7656119".to_string());
        let doc = entry_list_document(&[jane(), free]);

        let car1 = doc.section("CAR_1").unwrap();
        assert_eq!(car1.comments().collect::<Vec<_>>(), vec!["Free entry"]);
        assert_eq!(car1.get("GUID"), Some("7656119"));
    }

    #[test]
    fn output_reads_back_identically() {
        let mut other = jane();
        other.name = None;
        other.car = Some("bmw_z4_gt3".to_string());
        let doc = entry_list_document(&[jane(), other]);

        let parsed = IniDocument::parse(&doc.to_string()).unwrap();

        assert_eq!(parsed, doc);
        let keys: Vec<_> = parsed.sections[1].pairs().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "MODEL",
                "SKIN",
                "SPECTATOR_MODE",
                "DRIVERNAME",
                "TEAM",
                "GUID",
                "BALLAST",
                "RESTRICTOR"
            ]
        );
    }

    #[test]
    fn parse_rejects_orphan_keys() {
        let err = IniDocument::parse("MODEL=x\n[CAR_0]\n").unwrap_err();
        assert!(matches!(err, EntryListError::InvalidIni { line: 1, .. }));
    }

    #[test]
    fn parse_rejects_lines_without_delimiter() {
        let err = IniDocument::parse("[CAR_0]\nMODEL\n").unwrap_err();
        assert!(matches!(err, EntryListError::InvalidIni { line: 2, .. }));
    }
}
