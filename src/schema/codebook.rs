//! Closed string-to-code mappings for categorical fields

/// Fixed mapping from display string to the integer code used at training
/// time. Lookups are exact and case-sensitive; unknown strings have no code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCodebook {
    entries: Vec<(String, i64)>,
}

impl CategoryCodebook {
    /// Build a codebook from explicit `(label, code)` pairs.
    pub fn from_pairs(pairs: &[(&str, i64)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(label, code)| (label.to_string(), *code))
                .collect(),
        }
    }

    /// Build a codebook where each label's code is its position in `labels`.
    pub fn ordinal(labels: &[&str]) -> Self {
        Self {
            entries: labels
                .iter()
                .enumerate()
                .map(|(code, label)| (label.to_string(), code as i64))
                .collect(),
        }
    }

    /// Code for a display string, if the string belongs to the codebook.
    pub fn code(&self, label: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(known, _)| known == label)
            .map(|(_, code)| *code)
    }

    /// Display string for a code.
    pub fn label(&self, code: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, known)| *known == code)
            .map(|(label, _)| label.as_str())
    }

    /// Labels in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    /// Whether a label is listed more than once.
    pub(crate) fn has_duplicate_label(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .any(|(i, (label, _))| self.entries[..i].iter().any(|(l, _)| l == label))
    }

    /// Whether two labels map to the same code, which makes `label()` ambiguous.
    pub(crate) fn has_duplicate_code(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .any(|(i, (_, code))| self.entries[..i].iter().any(|(_, c)| c == code))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
