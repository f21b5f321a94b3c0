//! ISBN values: validation, conversion and decomposition
//!
//! The free functions take raw strings and are the simplest entry point.
//! [`Isbn`] wraps one normalized number together with a shared
//! [`RangeTable`] and memoizes every derived value, so repeated questions
//! about the same number cost nothing after the first call.

pub mod checksum;
mod normalize;
pub mod parts;
pub mod publication_range;

use once_cell::sync::OnceCell;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::ranges::{RangeTable, RegistrationGroup};

pub use normalize::normalize;
pub use parts::{PartsWidth, parts, registration_group, with_dashes};
pub use publication_range::{Isbn13s, PublicationRange};

/// GS1 prefix of every ISBN-13 that also has an ISBN-10 form.
pub const BOOKLAND_PREFIX: &str = "978";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IsbnKind {
    Isbn10,
    Isbn13,
}

/// `true` if `raw` normalizes to a well formed ISBN-10 or ISBN-13 with a
/// matching check character.
pub fn is_valid(raw: &str) -> bool {
    classify(&normalize(raw)).is_some()
}

/// Which format a valid input is in, `None` when invalid.
pub fn kind(raw: &str) -> Option<IsbnKind> {
    classify(&normalize(raw))
}

pub fn to_isbn13(raw: &str) -> Option<String> {
    isbn13_of(&normalize(raw))
}

pub fn to_isbn10(raw: &str) -> Option<String> {
    isbn10_of(&normalize(raw))
}

/// Replaces the check digit of any 13-digit number with the right one.
///
/// Unlike [`to_isbn13`] the input need not be valid, only thirteen digits
/// long once normalized.
pub fn corrected_isbn13(raw: &str) -> Option<String> {
    corrected_of(&normalize(raw))
}

pub(crate) fn classify(isbn: &str) -> Option<IsbnKind> {
    match isbn.len() {
        10 if valid_isbn10(isbn) => Some(IsbnKind::Isbn10),
        13 if valid_isbn13(isbn) => Some(IsbnKind::Isbn13),
        _ => None,
    }
}

fn valid_isbn10(isbn: &str) -> bool {
    let (body, check) = isbn.split_at(9);
    body.bytes().all(|b| b.is_ascii_digit())
        && check.chars().eq(std::iter::once(checksum::isbn10_check(body)))
}

fn valid_isbn13(isbn: &str) -> bool {
    let (body, check) = isbn.split_at(12);
    isbn.bytes().all(|b| b.is_ascii_digit())
        && check.chars().eq(std::iter::once(checksum::isbn13_check(body)))
}

/// ISBN-13 form of a normalized value. A valid 13-digit value is returned
/// as is; its check digit was already verified by validation.
pub(crate) fn isbn13_of(isbn: &str) -> Option<String> {
    match classify(isbn)? {
        IsbnKind::Isbn13 => Some(isbn.to_string()),
        IsbnKind::Isbn10 => {
            let mut isbn13 = format!("{}{}", BOOKLAND_PREFIX, &isbn[..9]);
            let check = checksum::isbn13_check(&isbn13);
            isbn13.push(check);
            Some(isbn13)
        }
    }
}

/// ISBN-10 form of a normalized value. 979 numbers have none.
pub(crate) fn isbn10_of(isbn: &str) -> Option<String> {
    match classify(isbn)? {
        IsbnKind::Isbn10 => Some(isbn.to_string()),
        IsbnKind::Isbn13 if isbn.starts_with(BOOKLAND_PREFIX) => {
            let mut isbn10 = isbn[3..12].to_string();
            let check = checksum::isbn10_check(&isbn10);
            isbn10.push(check);
            Some(isbn10)
        }
        IsbnKind::Isbn13 => None,
    }
}

pub(crate) fn corrected_of(isbn: &str) -> Option<String> {
    if isbn.len() != 13 || !isbn.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut corrected = isbn[..12].to_string();
    let check = checksum::isbn13_check(&corrected);
    corrected.push(check);
    Some(corrected)
}

#[derive(Debug, Clone, Default)]
struct Memo {
    kind: OnceCell<Option<IsbnKind>>,
    isbn13: OnceCell<Option<String>>,
    isbn10: OnceCell<Option<String>>,
    parts5: OnceCell<Option<Vec<String>>>,
    parts4: OnceCell<Option<Vec<String>>>,
    dashed: OnceCell<String>,
}

/// A normalized ISBN candidate bound to the range table used to split it.
///
/// Construction never fails: invalid input simply answers `false` /
/// `None` to every question. Derived values are computed on first use and
/// kept until [`Isbn::replace`] swaps in new content.
#[derive(Debug, Clone)]
pub struct Isbn {
    isbn: String,
    table: Arc<RangeTable>,
    memo: Memo,
}

impl Isbn {
    pub fn new(raw: &str, table: Arc<RangeTable>) -> Self {
        Self {
            isbn: normalize(raw),
            table,
            memo: Memo::default(),
        }
    }

    /// Normalized content: digits and `X` only.
    pub fn as_str(&self) -> &str {
        &self.isbn
    }

    pub fn table(&self) -> &Arc<RangeTable> {
        &self.table
    }

    /// Replaces the content and forgets everything derived from the old one.
    pub fn replace(&mut self, raw: &str) {
        self.isbn = normalize(raw);
        self.memo = Memo::default();
    }

    pub fn is_valid(&self) -> bool {
        self.kind().is_some()
    }

    pub fn kind(&self) -> Option<IsbnKind> {
        *self.memo.kind.get_or_init(|| classify(&self.isbn))
    }

    pub fn isbn13(&self) -> Option<&str> {
        if !self.is_valid() {
            return None;
        }
        self.memo
            .isbn13
            .get_or_init(|| isbn13_of(&self.isbn))
            .as_deref()
    }

    pub fn isbn10(&self) -> Option<&str> {
        if !self.is_valid() {
            return None;
        }
        self.memo
            .isbn10
            .get_or_init(|| isbn10_of(&self.isbn))
            .as_deref()
    }

    /// Recomputed check digit over the first twelve digits, valid or not.
    pub fn corrected_isbn13(&self) -> Option<String> {
        corrected_of(&self.isbn)
    }

    pub fn parts(&self, width: PartsWidth) -> Option<&[String]> {
        let cell = match width {
            PartsWidth::Five => &self.memo.parts5,
            PartsWidth::Four => &self.memo.parts4,
        };
        cell.get_or_init(|| {
            let isbn13 = self.isbn13()?;
            let isbn10 = match width {
                PartsWidth::Four => Some(self.isbn10()?),
                PartsWidth::Five => None,
            };
            parts::split(&self.table, isbn13, isbn10, width)
        })
        .as_deref()
    }

    /// Dashed display form; see [`with_dashes`].
    pub fn with_dashes(&self) -> &str {
        self.memo.dashed.get_or_init(|| {
            let five = if self.isbn.len() == 13 {
                self.parts(PartsWidth::Five)
            } else {
                None
            };
            parts::dashed(&self.isbn, five)
        })
    }

    pub fn registration_group(&self) -> Option<&RegistrationGroup> {
        self.table.find_group(self.isbn13()?)
    }

    /// Range of every ISBN-13 sharing this number's registrant code.
    pub fn publication_range(&self) -> Option<PublicationRange> {
        PublicationRange::from_parts(Arc::clone(&self.table), self.parts(PartsWidth::Five)?)
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.isbn)
    }
}

impl AsRef<str> for Isbn {
    fn as_ref(&self) -> &str {
        &self.isbn
    }
}

impl PartialEq for Isbn {
    fn eq(&self, other: &Self) -> bool {
        self.isbn == other.isbn
    }
}

impl Eq for Isbn {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_isbn10() {
        assert!(is_valid("0123456789"));
        assert!(is_valid("0-12-345678-9"));
        assert!(is_valid("832100928x"));
    }

    #[test]
    fn test_invalid_isbn10() {
        assert!(!is_valid("0123546789"));
        assert!(!is_valid("X123456789"));
    }

    #[test]
    fn test_valid_isbn13() {
        assert!(is_valid("9780000000002"));
        assert!(is_valid("978-1-4027-8059-2"));
    }

    #[test]
    fn test_invalid_isbn13() {
        assert!(!is_valid("9780000000003"));
        assert!(!is_valid("97800000X0002"));
        assert!(!is_valid("978000000000X"));
    }

    #[test]
    fn test_other_lengths_invalid() {
        assert!(!is_valid(""));
        assert!(!is_valid("012345678"));
        assert!(!is_valid("97800000000021"));
    }

    #[test]
    fn test_kind() {
        assert_eq!(kind("0123456789"), Some(IsbnKind::Isbn10));
        assert_eq!(kind("9780000000002"), Some(IsbnKind::Isbn13));
        assert_eq!(kind("9780000000003"), None);
    }

    #[test]
    fn test_to_isbn13() {
        assert_eq!(to_isbn13("0000000000").as_deref(), Some("9780000000002"));
        assert_eq!(to_isbn13("0123456789").as_deref(), Some("9780123456786"));
        assert_eq!(to_isbn13("9780000000002").as_deref(), Some("9780000000002"));
        assert_eq!(to_isbn13("0123546789"), None);
    }

    #[test]
    fn test_to_isbn10() {
        assert_eq!(to_isbn10("9781402780592").as_deref(), Some("1402780591"));
        assert_eq!(to_isbn10("9788321009285").as_deref(), Some("832100928X"));
        assert_eq!(to_isbn10("1402780591").as_deref(), Some("1402780591"));
    }

    #[test]
    fn test_to_isbn10_rejects_979() {
        assert!(is_valid("9791020000002"));
        assert_eq!(to_isbn10("9791020000002"), None);
    }

    #[test]
    fn test_corrected_isbn13() {
        assert_eq!(corrected_isbn13("9780000000003").as_deref(), Some("9780000000002"));
        assert_eq!(corrected_isbn13("9786017002000").as_deref(), Some("9786017002008"));
        assert_eq!(corrected_isbn13("0123456789"), None);
        assert_eq!(corrected_isbn13("97800000000X2"), None);
    }

    #[test]
    fn test_isbn_memo_reset_on_replace() {
        let table = Arc::new(RangeTable::default());
        let mut isbn = Isbn::new("0000000000", table);

        assert_eq!(isbn.isbn13(), Some("9780000000002"));
        isbn.replace("0123456789");
        assert_eq!(isbn.as_str(), "0123456789");
        assert_eq!(isbn.isbn13(), Some("9780123456786"));

        isbn.replace("0123546789");
        assert!(!isbn.is_valid());
        assert_eq!(isbn.isbn13(), None);
    }

    #[test]
    fn test_isbn_without_table_falls_back_to_single_dash() {
        let isbn = Isbn::new("9781402780592", Arc::new(RangeTable::default()));
        assert_eq!(isbn.parts(PartsWidth::Five), None);
        assert_eq!(isbn.with_dashes(), "978140278059-2");
    }
}
