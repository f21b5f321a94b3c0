//! Finding ISBNs in free text
//!
//! Candidates are runs of digits optionally broken up by single spaces or
//! hyphens, ten or thirteen digits long, the last of which may be an `X`.
//! Only candidates that validate are reported by [`scan`].

use regex::Regex;
use std::process::Command;
use std::sync::OnceLock;

use crate::isbn;

fn candidate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Thirteen-digit alternative first so it wins at the same start
        Regex::new(r"\b(?:(?:\d[\- ]?){12}\d|(?:\d[\- ]?){9}[\dXx])\b")
            .expect("candidate pattern is valid")
    })
}

/// A ten-digit number at the start of a longer candidate, ending at a
/// separator. Catches an ISBN-10 followed by an unrelated short number.
fn leading_isbn10_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:\d[\- ]?){9}[\dXx]\b").expect("leading ISBN-10 pattern is valid")
    })
}

/// Raw substrings that look like an ISBN, in order of appearance.
pub fn scan_candidates(text: &str) -> Vec<&str> {
    candidate_pattern()
        .find_iter(text)
        .map(|m| m.as_str())
        .collect()
}

/// Normalized valid ISBNs found in `text`, first occurrence order, no
/// duplicates.
pub fn scan(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for candidate in scan_candidates(text) {
        let mut normalized = isbn::normalize(candidate);
        if !isbn::is_valid(&normalized)
            && let Some(leading) = leading_isbn10_pattern().find(candidate)
        {
            normalized = isbn::normalize(leading.as_str());
        }
        if isbn::is_valid(&normalized) && !found.contains(&normalized) {
            found.push(normalized);
        }
    }
    tracing::debug!("Scanned {} bytes of text, {} ISBNs found", text.len(), found.len());
    found
}

/// Runs tesseract over an image (a cover or copyright page) and scans the
/// recognized text.
pub fn scan_image(image_path: &str) -> Result<Vec<String>, String> {
    // tesseract <image_path> stdout
    let output = Command::new("tesseract")
        .arg(image_path)
        .arg("stdout")
        .output()
        .map_err(|e| format!("Failed to execute tesseract: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("Tesseract failed: {}", stderr));
    }

    let text =
        String::from_utf8(output.stdout).map_err(|e| format!("Invalid UTF-8 output: {}", e))?;

    Ok(scan(&text))
}
