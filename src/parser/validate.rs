use serde::Deserialize;

use super::labels::SectionKind;
use super::sanitize::is_numeral;

/// Which characters count as a leading quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumeralPolicy {
    /// ASCII `0-9` only.
    Ascii,
    /// Unicode decimal digits in every script plus other numerals such as
    /// `½` or `²`. Roman-numeral letters like `Ⅻ` do not count.
    #[default]
    Unicode,
}

impl NumeralPolicy {
    pub fn is_numeral(self, c: char) -> bool {
        match self {
            NumeralPolicy::Ascii => c.is_ascii_digit(),
            NumeralPolicy::Unicode => is_numeral(c),
        }
    }
}

/// Whether a list found near a label is kept for `kind`.
pub fn accept(kind: SectionKind, items: &[String], numerals: NumeralPolicy) -> bool {
    if items.is_empty() {
        return false;
    }
    !kind.requires_quantity() || starts_with_quantity(items, numerals)
}

/// At least one item opens with a numeral.
fn starts_with_quantity(items: &[String], numerals: NumeralPolicy) -> bool {
    items
        .iter()
        .filter_map(|item| item.chars().next())
        .any(|c| numerals.is_numeral(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ingredients_need_one_quantity() {
        let ok = list(&["Salt", "2 eggs", "Pepper"]);
        assert!(accept(SectionKind::Ingredients, &ok, NumeralPolicy::Unicode));

        let decorative = list(&["Flour", "Eggs", "Salt"]);
        assert!(!accept(SectionKind::Ingredients, &decorative, NumeralPolicy::Unicode));
    }

    #[test]
    fn instructions_accepted_unconditionally() {
        let steps = list(&["Preheat the oven.", "Mix everything."]);
        assert!(accept(SectionKind::Instructions, &steps, NumeralPolicy::Ascii));
    }

    #[test]
    fn empty_lists_rejected() {
        assert!(!accept(SectionKind::Instructions, &[], NumeralPolicy::Unicode));
        assert!(!accept(SectionKind::Ingredients, &[], NumeralPolicy::Unicode));
    }

    #[test]
    fn fraction_glyph_depends_on_policy() {
        let items = list(&["½ cup butter", "Sugar"]);
        assert!(accept(SectionKind::Ingredients, &items, NumeralPolicy::Unicode));
        assert!(!accept(SectionKind::Ingredients, &items, NumeralPolicy::Ascii));
    }

    #[test]
    fn letter_numerals_are_not_quantities() {
        let items = list(&["Ⅻ Night Cocktail", "Ice"]);
        assert!(!accept(SectionKind::Ingredients, &items, NumeralPolicy::Unicode));
        assert!(accept(SectionKind::Ingredients, &list(&["٣ eggs"]), NumeralPolicy::Unicode));
    }

    #[test]
    fn digit_must_lead() {
        let items = list(&["Eggs, 2 large", "Flour (300 g)"]);
        assert!(!accept(SectionKind::Ingredients, &items, NumeralPolicy::Unicode));
    }

    #[test]
    fn policy_parses_lowercase() {
        let p: NumeralPolicy = serde_json::from_str("\"ascii\"").unwrap();
        assert_eq!(p, NumeralPolicy::Ascii);
    }
}
