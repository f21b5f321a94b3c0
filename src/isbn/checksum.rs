//! Check digit arithmetic for both ISBN formats.
//!
//! Both functions expect a body of ASCII digits of the right length
//! (9 for ISBN-10, 12 for ISBN-13). Callers check the shape first.

/// Check character for the nine leading digits of an ISBN-10.
///
/// Weights run 10 down to 2. A remainder of 0 gives `'0'`, 1 gives `'X'`,
/// anything else `11 - remainder`.
pub fn isbn10_check(body: &str) -> char {
    debug_assert_eq!(body.len(), 9);
    let sum: u32 = body
        .bytes()
        .zip((2..=10u32).rev())
        .map(|(b, weight)| u32::from(b - b'0') * weight)
        .sum();

    match sum % 11 {
        0 => '0',
        1 => 'X',
        r => char::from(b'0' + (11 - r) as u8),
    }
}

/// Check digit for the twelve leading digits of an ISBN-13.
///
/// Weights alternate 1, 3 from the left.
pub fn isbn13_check(body: &str) -> char {
    debug_assert_eq!(body.len(), 12);
    let sum: u32 = body
        .bytes()
        .zip([1u32, 3].into_iter().cycle())
        .map(|(b, weight)| u32::from(b - b'0') * weight)
        .sum();

    match sum % 10 {
        0 => '0',
        r => char::from(b'0' + (10 - r) as u8),
    }
}

/// Renders a twelve-digit body as a complete ISBN-13.
pub(crate) fn isbn13_from_body(body: u64) -> String {
    let mut isbn = format!("{:012}", body);
    let check = isbn13_check(&isbn);
    isbn.push(check);
    isbn
}
