//! Ordered multi-valued key/value data from form bodies and query strings.

/// Ordered multi-map of string keys to string values.
///
/// A key may repeat; [`FormData::get`] returns its first value and
/// [`FormData::get_list`] all of them in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Parse an `application/x-www-form-urlencoded` string (a query string
    /// without its leading `?`).
    ///
    /// `+` decodes to a space. Pairs whose percent-encoding is not valid
    /// UTF-8 are kept undecoded.
    #[must_use]
    pub fn parse(encoded: &str) -> Self {
        let mut data = Self::new();
        for pair in encoded.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            data.append(decode_component(key), decode_component(value));
        }
        data
    }

    /// Add a value, keeping any earlier values for the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Builder-style [`append`](Self::append).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn get_list(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(candidate, _)| candidate == key)
    }

    /// Distinct keys in first-seen order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (key, _) in &self.pairs {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        keys
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(error) => {
            tracing::debug!(%error, component = raw, "keeping undecodable form component");
            spaced
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn repeated_keys_keep_arrival_order() {
        let data = FormData::new().with("tag", "a").with("name", "rex").with("tag", "b");
        assert_eq!(data.get("tag"), Some("a"));
        assert_eq!(data.get_list("tag"), vec!["a", "b"]);
        assert_eq!(data.keys(), vec!["tag", "name"]);
        assert_eq!(data.get("missing"), None);
        assert!(data.get_list("missing").is_empty());
    }

    #[test]
    fn parses_urlencoded_pairs() {
        let data = FormData::parse("name=Rex+the%20Dog&tag=a&tag=b&flag&=empty");
        assert_eq!(data.get("name"), Some("Rex the Dog"));
        assert_eq!(data.get_list("tag"), vec!["a", "b"]);
        assert_eq!(data.get("flag"), Some(""));
        assert_eq!(data.get(""), Some("empty"));
    }

    #[test]
    fn empty_string_parses_to_nothing() {
        assert!(FormData::parse("").is_empty());
    }
}
