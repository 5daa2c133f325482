//! Query-string construction
//!
//! Dovetail list endpoints take nested parameters in bracket notation, e.g.
//! `page[limit]=10&filter[title][contains]=onboarding&sort[0]=created_at:desc`.
//! Pairs are form-encoded in the order they are appended.

use url::form_urlencoded;

/// Ordered builder for a form-encoded query string
pub struct QueryBuilder {
    serializer: form_urlencoded::Serializer<'static, String>,
    pairs: usize,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            serializer: form_urlencoded::Serializer::new(String::new()),
            pairs: 0,
        }
    }

    /// Append a pair unconditionally
    pub fn append(&mut self, key: &str, value: &str) -> &mut Self {
        self.serializer.append_pair(key, value);
        self.pairs += 1;
        self
    }

    /// Append a pair when the value is present and not empty
    pub fn append_non_empty(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.append(key, value);
        }
        self
    }

    /// Append `key[i]=value` for every non-empty value, keeping its original
    /// index
    pub fn append_indexed<S: AsRef<str>>(&mut self, key: &str, values: &[S]) -> &mut Self {
        for (i, value) in values.iter().enumerate() {
            let value = value.as_ref();
            if !value.is_empty() {
                self.append(&format!("{}[{}]", key, i), value);
            }
        }
        self
    }

    /// Number of pairs appended so far
    pub fn len(&self) -> usize {
        self.pairs
    }

    /// Whether no pair has been appended
    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }

    /// Finish the query string, or `None` when nothing was appended
    pub fn finish(mut self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.serializer.finish())
        }
    }
}
