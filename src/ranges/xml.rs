//! Range Message XML loader
//!
//! Reads the agency's `RangeMessage.xml` with quick-xml's serde support and
//! turns every `<Group>` into a [`RegistrationGroup`]. Rules with a length of
//! zero mark unused ranges and are dropped here so they never reach lookups.

use serde::Deserialize;
use std::path::Path;

use super::{MessageHeader, RangeRule, RangeTable, RegistrationGroup};
use crate::domain::RangeTableError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RangeMessage {
    message_source: Option<String>,
    message_serial_number: Option<String>,
    message_date: Option<String>,
    registration_groups: RegistrationGroups,
}

#[derive(Debug, Deserialize)]
struct RegistrationGroups {
    #[serde(rename = "Group", default)]
    groups: Vec<GroupXml>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GroupXml {
    prefix: String,
    agency: Option<String>,
    #[serde(default)]
    rules: RulesXml,
}

#[derive(Debug, Default, Deserialize)]
struct RulesXml {
    #[serde(rename = "Rule", default)]
    rules: Vec<RuleXml>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RuleXml {
    range: String,
    length: String,
}

impl RangeTable {
    pub fn from_xml_file(path: impl AsRef<Path>) -> Result<Self, RangeTableError> {
        let path = path.as_ref();
        tracing::debug!("Loading range message from {}", path.display());
        let xml = std::fs::read_to_string(path)?;
        Self::from_xml_str(&xml)
    }

    pub fn from_xml_str(xml: &str) -> Result<Self, RangeTableError> {
        let message: RangeMessage =
            quick_xml::de::from_str(xml).map_err(|e| RangeTableError::Xml(e.to_string()))?;

        let mut dropped = 0usize;
        let mut groups = Vec::with_capacity(message.registration_groups.groups.len());

        for group in message.registration_groups.groups {
            let prefix: String = group.prefix.trim().chars().filter(|c| *c != '-').collect();

            let mut rules = Vec::with_capacity(group.rules.rules.len());
            for rule in &group.rules.rules {
                match parse_rule(&group.prefix, rule)? {
                    Some(rule) => rules.push(rule),
                    None => dropped += 1,
                }
            }

            let agency = group.agency.map(|a| a.trim().to_string());
            groups.push(RegistrationGroup::new(prefix, agency, rules));
        }

        if dropped > 0 {
            tracing::debug!("Dropped {} unused (length 0) range rules", dropped);
        }

        let header = MessageHeader {
            source: message.message_source,
            serial_number: message.message_serial_number,
            date: message.message_date,
        };
        RangeTable::with_header(header, groups)
    }
}

/// `Ok(None)` for a length-0 placeholder rule.
fn parse_rule(group: &str, rule: &RuleXml) -> Result<Option<RangeRule>, RangeTableError> {
    let invalid = |reason: String| RangeTableError::InvalidRule {
        group: group.trim().to_string(),
        reason,
    };

    let length: usize = rule
        .length
        .trim()
        .parse()
        .map_err(|_| invalid(format!("length {:?} is not a number", rule.length)))?;
    if length == 0 {
        return Ok(None);
    }

    let (lo, hi) = rule
        .range
        .trim()
        .split_once('-')
        .ok_or_else(|| invalid(format!("range {:?} has no separator", rule.range)))?;

    let bad_range = || invalid(format!("bad range {:?}", rule.range));
    let lo = truncate_bound(lo, length).ok_or_else(bad_range)?;
    let hi = truncate_bound(hi, length).ok_or_else(bad_range)?;

    RangeRule::new(lo..=hi, length)
        .map(Some)
        .ok_or_else(|| invalid(format!("range {:?} with length {}", rule.range, length)))
}

/// Keeps the first `length` digits of a seven-digit bound.
fn truncate_bound(bound: &str, length: usize) -> Option<u32> {
    let digits = bound.get(..length).unwrap_or(bound);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<ISBNRangeMessage>
  <MessageSource>International ISBN Agency</MessageSource>
  <MessageSerialNumber>test-1</MessageSerialNumber>
  <MessageDate>Sat, 1 Jan 2022 00:00:00 GMT</MessageDate>
  <EAN.UCCPrefixes>
    <EAN.UCC>
      <Prefix>978</Prefix>
      <Agency>International ISBN Agency</Agency>
      <Rules>
        <Rule><Range>0000000-5999999</Range><Length>1</Length></Rule>
      </Rules>
    </EAN.UCC>
  </EAN.UCCPrefixes>
  <RegistrationGroups>
    <Group>
      <Prefix>978-601</Prefix>
      <Agency>Kazakhstan</Agency>
      <Rules>
        <Rule><Range>0000000-1999999</Range><Length>2</Length></Rule>
        <Rule><Range>2000000-6999999</Range><Length>3</Length></Rule>
        <Rule><Range>7000000-7999999</Range><Length>4</Length></Rule>
      </Rules>
    </Group>
    <Group>
      <Prefix>978-99901</Prefix>
      <Agency>Bahrain</Agency>
      <Rules>
        <Rule><Range>0000000-4999999</Range><Length>2</Length></Rule>
        <Rule><Range>5000000-7999999</Range><Length>0</Length></Rule>
        <Rule><Range>8000000-9999999</Range><Length>2</Length></Rule>
      </Rules>
    </Group>
  </RegistrationGroups>
</ISBNRangeMessage>
"#;

    #[test]
    fn test_parse_groups_and_rules() {
        let table = RangeTable::from_xml_str(MESSAGE).unwrap();

        assert_eq!(table.len(), 2);
        let kz = table.group("978601").unwrap();
        assert_eq!(kz.agency(), Some("Kazakhstan"));
        assert_eq!(kz.rules().len(), 3);
        assert_eq!(kz.rules()[0].range(), 0..=19);
        assert_eq!(kz.rules()[1].range(), 200..=699);
        assert_eq!(kz.rules()[2].range(), 7000..=7999);
        assert_eq!(kz.rules()[2].length(), 4);
    }

    #[test]
    fn test_zero_length_rules_dropped() {
        let table = RangeTable::from_xml_str(MESSAGE).unwrap();

        let bahrain = table.group("97899901").unwrap();
        assert_eq!(bahrain.rules().len(), 2);
        assert!(table.groups().iter().flat_map(|g| g.rules()).all(|r| r.length() > 0));
    }

    #[test]
    fn test_header_parsed() {
        let table = RangeTable::from_xml_str(MESSAGE).unwrap();
        assert_eq!(
            table.header().source.as_deref(),
            Some("International ISBN Agency")
        );
        assert_eq!(table.header().serial_number.as_deref(), Some("test-1"));
    }

    #[test]
    fn test_bad_length_is_an_error() {
        let xml = MESSAGE.replace("<Length>4</Length>", "<Length>four</Length>");
        let result = RangeTable::from_xml_str(&xml);
        assert!(matches!(result, Err(RangeTableError::InvalidRule { .. })));
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let result = RangeTable::from_xml_str("<ISBNRangeMessage><RegistrationGroups>");
        assert!(matches!(result, Err(RangeTableError::Xml(_))));
    }

    #[test]
    fn test_truncate_bound() {
        assert_eq!(truncate_bound("1999999", 2), Some(19));
        assert_eq!(truncate_bound("0000000", 3), Some(0));
        assert_eq!(truncate_bound("12", 5), Some(12));
        assert_eq!(truncate_bound("12a", 3), None);
    }
}
