//! Registration group range table
//!
//! The ISBN agency publishes, for every registration group, the numeric
//! ranges in which registrant codes of a given width are assigned. This
//! module holds that table in memory. It is built once, never mutated, and
//! shared between ISBN values through an `Arc`.

pub mod cache;
pub mod xml;

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

use crate::domain::RangeTableError;

/// Widest registrant code a rule may describe.
pub const MAX_RULE_LENGTH: usize = 9;

/// One `(range, length)` pair of a registration group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRule {
    start: u32,
    end: u32,
    length: usize,
}

impl RangeRule {
    /// Returns `None` for an empty range or a zero length.
    pub fn new(range: RangeInclusive<u32>, length: usize) -> Option<Self> {
        let (start, end) = range.into_inner();
        if length == 0 || length > MAX_RULE_LENGTH || start > end {
            return None;
        }
        Some(Self { start, end, length })
    }

    pub fn range(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    /// Number of digits of the registrant code this rule applies to.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn contains(&self, number: u32) -> bool {
        self.range().contains(&number)
    }
}

/// A registration group: its prefix (GS1 prefix included, no dashes) and
/// the rules tried in order for registrant codes inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationGroup {
    prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    agency: Option<String>,
    rules: Vec<RangeRule>,
}

impl RegistrationGroup {
    pub fn new(prefix: impl Into<String>, agency: Option<String>, rules: Vec<RangeRule>) -> Self {
        Self {
            prefix: prefix.into(),
            agency,
            rules,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Name of the group as published by the agency, e.g. "English language".
    pub fn agency(&self) -> Option<&str> {
        self.agency.as_deref()
    }

    pub fn rules(&self) -> &[RangeRule] {
        &self.rules
    }

    /// The three-digit GS1 prefix ("978" or "979").
    pub fn gs1(&self) -> &str {
        self.prefix.get(..3).unwrap_or_default()
    }

    /// The registration group identifier without the GS1 prefix.
    pub fn identifier(&self) -> &str {
        self.prefix.get(3..).unwrap_or_default()
    }

    /// Dashed form as printed in the Range Message, e.g. "978-601".
    pub fn dashed_prefix(&self) -> String {
        format!("{}-{}", self.gs1(), self.identifier())
    }

    /// First rule whose range holds the registrant candidate read from
    /// `digits`, the part of an ISBN-13 body right after this group.
    pub fn match_rule(&self, digits: &str) -> Option<(&RangeRule, u32)> {
        self.rules.iter().find_map(|rule| {
            let candidate: u32 = digits.get(..rule.length)?.parse().ok()?;
            rule.contains(candidate).then_some((rule, candidate))
        })
    }
}

/// Header of the Range Message the table was loaded from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub source: Option<String>,
    pub serial_number: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeTable {
    #[serde(default)]
    header: MessageHeader,
    groups: Vec<RegistrationGroup>,
}

impl RangeTable {
    /// Builds a table from groups in load order, rejecting malformed data.
    pub fn new(groups: Vec<RegistrationGroup>) -> Result<Self, RangeTableError> {
        Self::with_header(MessageHeader::default(), groups)
    }

    pub fn with_header(
        header: MessageHeader,
        groups: Vec<RegistrationGroup>,
    ) -> Result<Self, RangeTableError> {
        let table = Self { header, groups };
        table.validate()?;

        for (first, second) in table.ambiguous_prefixes() {
            tracing::warn!(
                "Registration groups {} and {} overlap; the first one in table order wins",
                first,
                second
            );
        }
        tracing::debug!(
            "Range table ready: {} groups, {} rules",
            table.groups.len(),
            table.rule_count()
        );

        Ok(table)
    }

    /// Loads a table from disk, picking the format from the file extension:
    /// `.xml` for a Range Message, `.json` / `.msgpack` / `.mpk` for a cache.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RangeTableError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xml") => Self::from_xml_file(path),
            _ => match cache::CacheFormat::from_path(path) {
                Some(format) => Self::load_cache(path, format),
                None => Err(RangeTableError::UnsupportedFormat(
                    path.display().to_string(),
                )),
            },
        }
    }

    /// Loads `source`, going through the cache file at `cache` when given.
    ///
    /// An existing cache is read instead of the source. A missing cache is
    /// written after the source has been parsed.
    pub fn load_with_cache(
        source: impl AsRef<Path>,
        cache: Option<&Path>,
    ) -> Result<Self, RangeTableError> {
        let Some(cache) = cache else {
            return Self::load(source);
        };

        if cache.exists() {
            tracing::debug!("Range cache hit: {}", cache.display());
            return Self::load(cache);
        }

        tracing::debug!("Range cache miss, parsing {}", source.as_ref().display());
        let table = Self::load(source)?;
        if let Err(e) = table.save(cache) {
            tracing::warn!("Failed to write range cache {}: {}", cache.display(), e);
        }
        Ok(table)
    }

    pub fn header(&self) -> &MessageHeader {
        &self.header
    }

    pub fn groups(&self) -> &[RegistrationGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn rule_count(&self) -> usize {
        self.groups.iter().map(|g| g.rules.len()).sum()
    }

    /// Group with exactly this prefix (GS1 included, no dashes).
    pub fn group(&self, prefix: &str) -> Option<&RegistrationGroup> {
        self.groups.iter().find(|g| g.prefix == prefix)
    }

    /// First group, in table order, whose prefix starts `isbn13`.
    pub fn find_group(&self, isbn13: &str) -> Option<&RegistrationGroup> {
        let mut matches = self.groups.iter().filter(|g| isbn13.starts_with(&g.prefix));
        let found = matches.next();
        debug_assert!(
            matches.next().is_none(),
            "more than one registration group matches {}",
            isbn13
        );
        found
    }

    /// Pairs of groups where one prefix is a prefix of the other. A well
    /// formed Range Message has none.
    pub fn ambiguous_prefixes(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (i, a) in self.groups.iter().enumerate() {
            for b in &self.groups[i + 1..] {
                if a.prefix.starts_with(&b.prefix) || b.prefix.starts_with(&a.prefix) {
                    pairs.push((a.dashed_prefix(), b.dashed_prefix()));
                }
            }
        }
        pairs
    }

    fn validate(&self) -> Result<(), RangeTableError> {
        for group in &self.groups {
            let prefix = &group.prefix;
            let digits_only = prefix.bytes().all(|b| b.is_ascii_digit());
            if !digits_only || !(4..=12).contains(&prefix.len()) {
                return Err(RangeTableError::InvalidGroup(prefix.clone()));
            }
            for rule in &group.rules {
                if rule.length == 0 || rule.length > MAX_RULE_LENGTH || rule.start > rule.end {
                    return Err(RangeTableError::InvalidRule {
                        group: group.dashed_prefix(),
                        reason: format!(
                            "range {}-{} with length {}",
                            rule.start, rule.end, rule.length
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}
