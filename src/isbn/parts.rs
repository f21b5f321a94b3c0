//! Splitting an ISBN into its registration parts
//!
//! The group is found by prefix, then the group's rules decide how many of
//! the following digits belong to the registrant. The rest up to the check
//! digit is the publication item number.

use serde::{Deserialize, Serialize};

use super::{isbn10_of, isbn13_of, normalize};
use crate::ranges::{RangeTable, RegistrationGroup};

/// How many parts to split into: four for the ISBN-10 layout
/// (group, registrant, item, check) or five for ISBN-13 (GS1 prefix first).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartsWidth {
    Four,
    #[default]
    Five,
}

/// Splits `raw` into its parts, `None` when it is invalid, has no ISBN-10
/// form while four parts are asked for, or falls in an unassigned range.
pub fn parts(table: &RangeTable, raw: &str, width: PartsWidth) -> Option<Vec<String>> {
    let isbn = normalize(raw);
    let isbn13 = isbn13_of(&isbn)?;
    let isbn10 = match width {
        PartsWidth::Four => Some(isbn10_of(&isbn)?),
        PartsWidth::Five => None,
    };
    split(table, &isbn13, isbn10.as_deref(), width)
}

/// Dashed display form.
///
/// A decomposable ISBN-13 gets a dash between every part. Anything else
/// longer than three characters gets a single dash before its last
/// character, and shorter input is returned normalized.
pub fn with_dashes(table: &RangeTable, raw: &str) -> String {
    let isbn = normalize(raw);
    let five = if isbn.len() == 13 {
        parts(table, &isbn, PartsWidth::Five)
    } else {
        None
    };
    dashed(&isbn, five.as_deref())
}

/// The registration group a valid ISBN belongs to.
pub fn registration_group<'t>(table: &'t RangeTable, raw: &str) -> Option<&'t RegistrationGroup> {
    table.find_group(&isbn13_of(&normalize(raw))?)
}

pub(crate) fn dashed(isbn: &str, parts: Option<&[String]>) -> String {
    if let Some(parts) = parts {
        return parts.join("-");
    }
    if isbn.len() > 3 {
        let (body, check) = isbn.split_at(isbn.len() - 1);
        format!("{}-{}", body, check)
    } else {
        isbn.to_string()
    }
}

/// Core decomposition. `isbn13` must be a valid ISBN-13 and `isbn10`, when
/// four parts are wanted, its ISBN-10 form.
pub(crate) fn split(
    table: &RangeTable,
    isbn13: &str,
    isbn10: Option<&str>,
    width: PartsWidth,
) -> Option<Vec<String>> {
    let group = table.find_group(isbn13)?;
    let group_len = group.prefix().len();

    // Registrant digits never run into the check digit.
    let (rule, number) = group.match_rule(isbn13.get(group_len..12)?)?;
    let registrant = format!("{:0width$}", number, width = rule.length());
    let registrant_end = group_len + registrant.len();

    let parts = match width {
        PartsWidth::Five => vec![
            isbn13[..3].to_string(),
            isbn13[3..group_len].to_string(),
            registrant,
            isbn13[registrant_end..12].to_string(),
            isbn13[12..].to_string(),
        ],
        PartsWidth::Four => {
            let isbn10 = isbn10?;
            let group_end = group_len - 3;
            let registrant_end = group_end + registrant.len();
            vec![
                isbn10[..group_end].to_string(),
                registrant,
                isbn10[registrant_end..9].to_string(),
                isbn10[9..].to_string(),
            ]
        }
    };
    Some(parts)
}
