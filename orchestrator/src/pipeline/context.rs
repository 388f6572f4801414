use crate::models::RetrievalResult;

/// Concatenates document contents in their retrieved order (most relevant
/// first), one per line. The result set is already deduplicated and capped,
/// so nothing is reordered or dropped here.
pub fn assemble(result: &RetrievalResult) -> String {
    result
        .documents
        .iter()
        .map(|d| d.document.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
