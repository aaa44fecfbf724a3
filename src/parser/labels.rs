use std::fmt;

/// Category of list content pulled from a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum SectionKind {
    Ingredients,
    Instructions,
}

impl SectionKind {
    pub const ALL: [SectionKind; 2] = [SectionKind::Ingredients, SectionKind::Instructions];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Ingredients => "ingredients",
            SectionKind::Instructions => "instructions",
        }
    }

    /// Banner title used in text output.
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Ingredients => "Ingredients",
            SectionKind::Instructions => "Instructions",
        }
    }

    /// Ingredient lists must look like quantities; instruction lists are
    /// taken as found.
    pub fn requires_quantity(self) -> bool {
        matches!(self, SectionKind::Ingredients)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of section headings matched against whole text nodes.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for label in labels {
            let label = label.as_ref().trim().to_lowercase();
            if !label.is_empty() && !normalized.contains(&label) {
                normalized.push(label);
            }
        }
        LabelSet { labels: normalized }
    }

    /// Exact, case-insensitive match of the trimmed text. No substrings.
    pub fn matches(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        let lowered = text.to_lowercase();
        self.labels.iter().any(|l| *l == lowered)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
