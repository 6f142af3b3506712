/// Maximum number of remembered searches.
pub const HISTORY_LIMIT: usize = 10;

/// Recent searches, most recent first, without duplicates.
///
/// Lives for the process only. Comparison is case-sensitive, so "london"
/// and "London" are separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHistory {
    entries: Vec<String>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `city` at the front, dropping any earlier copy and the oldest
    /// entry past the limit. Blank input is ignored.
    pub fn add(&mut self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            return;
        }

        self.entries.retain(|e| e != city);
        self.entries.insert(0, city.to_string());
        self.entries.truncate(HISTORY_LIMIT);
    }

    pub fn list(&self) -> &[String] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
