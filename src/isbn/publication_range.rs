//! All ISBN-13s addressable under one registrant code
//!
//! A registrant owns every item number that fits between its code and the
//! check digit. For a four-digit registrant in a three-digit group that is
//! 100 numbers; for the shortest codes it is up to a hundred billion, so the
//! members are only ever produced lazily.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

use super::checksum::isbn13_from_body;
use super::parts::{self, PartsWidth};
use super::{isbn13_of, normalize};
use crate::ranges::RangeTable;

#[derive(Debug, Clone)]
pub struct PublicationRange {
    parts: Vec<String>,
    prefix: String,
    bodies: RangeInclusive<u64>,
    table: Arc<RangeTable>,
}

impl PublicationRange {
    /// Range of the registrant `seed` belongs to. `None` unless the seed
    /// decomposes against `table`.
    pub fn new(table: Arc<RangeTable>, seed: &str) -> Option<Self> {
        let seed_parts = parts::parts(&table, seed, PartsWidth::Five)?;
        Self::from_parts(table, &seed_parts)
    }

    pub(crate) fn from_parts(table: Arc<RangeTable>, seed_parts: &[String]) -> Option<Self> {
        let parts = seed_parts.get(..3)?.to_vec();
        let prefix = parts.concat();
        if prefix.len() > 12 {
            return None;
        }

        let multiplier = 10u64.pow((12 - prefix.len()) as u32);
        let prefix_number: u64 = prefix.parse().ok()?;
        let from = prefix_number * multiplier;
        let to = (prefix_number + 1) * multiplier - 1;

        Some(Self {
            parts,
            prefix,
            bodies: from..=to,
            table,
        })
    }

    /// GS1 prefix, registration group and registrant code.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The three leading parts joined, e.g. `"9786017002"`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Digits left for the publication item number.
    pub fn item_width(&self) -> usize {
        12 - self.prefix.len()
    }

    pub fn number_of_publications(&self) -> u64 {
        10u64.pow(self.item_width() as u32)
    }

    pub fn publication_numbers(&self) -> RangeInclusive<u64> {
        0..=self.number_of_publications() - 1
    }

    /// Lowest ISBN-13 in the range.
    pub fn first(&self) -> String {
        isbn13_from_body(*self.bodies.start())
    }

    /// Highest ISBN-13 in the range.
    pub fn last(&self) -> String {
        isbn13_from_body(*self.bodies.end())
    }

    /// The ISBN-13 with the given publication item number.
    pub fn nth_publication(&self, number: u64) -> Option<String> {
        if number >= self.number_of_publications() {
            return None;
        }
        Some(isbn13_from_body(self.bodies.start() + number))
    }

    /// `true` when `raw` is a valid ISBN whose ISBN-13 form starts with
    /// this range's prefix.
    pub fn contains(&self, raw: &str) -> bool {
        isbn13_of(&normalize(raw)).is_some_and(|isbn13| isbn13.starts_with(&self.prefix))
    }

    /// Every valid ISBN-13 of the range in ascending order. Each call
    /// starts over from the first member.
    pub fn isbn13s(&self) -> Isbn13s {
        Isbn13s {
            bodies: self.bodies.clone(),
        }
    }
}

impl fmt::Display for PublicationRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            parts::with_dashes(&self.table, &self.first()),
            parts::with_dashes(&self.table, &self.last())
        )
    }
}

/// Lazy iterator over the members of a [`PublicationRange`].
#[derive(Debug, Clone)]
pub struct Isbn13s {
    bodies: RangeInclusive<u64>,
}

impl Iterator for Isbn13s {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.bodies.next().map(isbn13_from_body)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.bodies.size_hint()
    }

    fn nth(&mut self, n: usize) -> Option<String> {
        self.bodies.nth(n).map(isbn13_from_body)
    }
}

impl DoubleEndedIterator for Isbn13s {
    fn next_back(&mut self) -> Option<String> {
        self.bodies.next_back().map(isbn13_from_body)
    }
}

impl std::iter::FusedIterator for Isbn13s {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::{RangeRule, RegistrationGroup};

    fn table() -> Arc<RangeTable> {
        Arc::new(
            RangeTable::new(vec![RegistrationGroup::new(
                "978601",
                Some("Kazakhstan".to_string()),
                vec![
                    RangeRule::new(0..=19, 2).unwrap(),
                    RangeRule::new(200..=699, 3).unwrap(),
                    RangeRule::new(7000..=7999, 4).unwrap(),
                ],
            )])
            .unwrap(),
        )
    }

    #[test]
    fn test_range_from_seed() {
        let range = PublicationRange::new(table(), "9786017002015").unwrap();

        assert_eq!(range.prefix(), "9786017002");
        assert_eq!(range.parts(), ["978", "601", "7002"]);
        assert_eq!(range.number_of_publications(), 100);
        assert_eq!(range.publication_numbers(), 0..=99);
        assert_eq!(range.to_string(), "978-601-7002-00-8..978-601-7002-99-2");
    }

    #[test]
    fn test_isbn13s_enumerates_lazily() {
        let range = PublicationRange::new(table(), "9786017002015").unwrap();

        let mut members = range.isbn13s();
        assert_eq!(members.next().as_deref(), Some("9786017002008"));
        assert_eq!(members.next().as_deref(), Some("9786017002015"));

        assert_eq!(range.isbn13s().count(), 100);
        assert_eq!(range.isbn13s().next_back().as_deref(), Some("9786017002992"));
        assert!(range.isbn13s().all(|isbn| crate::isbn::is_valid(&isbn)));
    }

    #[test]
    fn test_isbn13s_restarts() {
        let range = PublicationRange::new(table(), "9786017002015").unwrap();
        let first: Vec<String> = range.isbn13s().take(3).collect();
        let again: Vec<String> = range.isbn13s().take(3).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_large_range_is_not_materialized() {
        // Two-digit registrant leaves four item digits
        let range = PublicationRange::new(table(), "9786010500006").unwrap();
        assert_eq!(range.prefix(), "97860105");
        assert_eq!(range.number_of_publications(), 10_000);
        assert_eq!(range.isbn13s().size_hint(), (10_000, Some(10_000)));
        assert_eq!(range.isbn13s().nth(1).as_deref(), Some("9786010500013"));
    }

    #[test]
    fn test_contains_and_nth() {
        let range = PublicationRange::new(table(), "9786017002015").unwrap();
        assert!(range.contains("978-601-7002-42-8"));
        assert!(!range.contains("9786017003005"));
        assert_eq!(range.nth_publication(1).as_deref(), Some("9786017002015"));
        assert_eq!(range.nth_publication(100), None);
    }

    #[test]
    fn test_none_for_unsplittable_seed() {
        assert!(PublicationRange::new(table(), "9780000000002").is_none());
        assert!(PublicationRange::new(table(), "not an isbn").is_none());
    }
}
