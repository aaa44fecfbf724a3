pub mod extract;
pub mod items;
pub mod labels;
pub mod locate;
pub mod sanitize;
pub mod validate;

use scraper::Html;

use extract::{Extractor, SectionResults};
use labels::SectionKind;

/// Pipeline: HTML → tree → labels → nearest lists → cleaned items → validated lists.
pub fn extract_page(html: &str, extractor: &Extractor, kinds: &[SectionKind]) -> SectionResults {
    let doc = Html::parse_document(html);
    extractor.extract_sections(&doc, kinds)
}
