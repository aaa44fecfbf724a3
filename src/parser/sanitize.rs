use unicode_properties::{GeneralCategory, GeneralCategoryGroup, UnicodeGeneralCategory};

/// Punctuation kept verbatim in item text.
const KEPT_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '\'', '"', '!', '?', '-', '(', ')', '[', ']', '{', '}', '/', '\\', '&',
    '%', '$', '#', '@', '*', '+', '=', '<', '>', '|', '~', '`',
];

/// Keep letters (category L*), whitespace, numerals (digits and glyphs like
/// `½`) and the fixed punctuation set. Everything else (emoji, symbols, control chars)
/// is dropped. Order is preserved, nothing is trimmed or folded.
pub fn sanitize(raw: &str) -> String {
    raw.chars().filter(|&c| is_content_char(c)).collect()
}

fn is_content_char(c: char) -> bool {
    c.general_category_group() == GeneralCategoryGroup::Letter
        || c.is_whitespace()
        || is_numeral(c)
        || KEPT_PUNCTUATION.contains(&c)
}

/// Decimal digits in any script (Nd) and other numerals such as `½` or `²`
/// (No). Letter-like numerals (Nl, e.g. `Ⅻ`) are not included.
pub fn is_numeral(c: char) -> bool {
    matches!(
        c.general_category(),
        GeneralCategory::DecimalNumber | GeneralCategory::OtherNumber
    )
}
