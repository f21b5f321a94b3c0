/// Reduces arbitrary input to the ISBN alphabet: ASCII digits and `X`.
///
/// Lowercase `x` is upper-cased first; every other character is discarded.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_uppercase)
        .filter(|c| c.is_ascii_digit() || *c == 'X')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_noise() {
        assert_eq!(normalize("9487-028asdfasdf878X7"), "9487028878X7");
        assert_eq!(normalize("ISBN 0-12-345678-9"), "0123456789");
        assert_eq!(normalize("83-210-0928-x"), "832100928X");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("no digits here"), "");
    }

    #[test]
    fn test_normalize_drops_non_ascii_digits() {
        // Arabic-Indic digits are not part of the ISBN alphabet
        assert_eq!(normalize("٠١٢3"), "3");
    }
}
