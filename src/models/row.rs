//! Row shapes flowing between the loader and the normalizer.

/// One raw registry row, exactly as the loader produced it.
///
/// Headers are kept verbatim, surrounding whitespace included. Fields are
/// kept in column order; a short CSV line simply has fewer entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    /// Zero-based position of the row in the source
    pub index: usize,
    pub fields: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            fields: Vec::new(),
        }
    }

    /// Builder-style insert, handy for hosts that assemble rows by hand
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// Exact-key lookup. Does not trim; see [`NormalizedRow`] for that.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A row that survived normalization: trimmed keys, planar values present,
/// status active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub source_index: usize,
    fields: Vec<(String, String)>,
    raw_x: String,
    raw_y: String,
}

impl NormalizedRow {
    pub(crate) fn new(
        source_index: usize,
        fields: Vec<(String, String)>,
        raw_x: String,
        raw_y: String,
    ) -> Self {
        Self {
            source_index,
            fields,
            raw_x,
            raw_y,
        }
    }

    /// Lookup by trimmed field name
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Same as [`field`](Self::field) but absent reads as empty
    pub fn text(&self, key: &str) -> String {
        self.field(key).map(str::trim).unwrap_or_default().to_string()
    }

    /// Planar x exactly as it appeared in the source, trimmed
    pub fn raw_x(&self) -> &str {
        &self.raw_x
    }

    pub fn raw_y(&self) -> &str {
        &self.raw_y
    }
}
