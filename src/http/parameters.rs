//! Multi-valued URL and form parameters.

use std::collections::BTreeMap;

/// Parameter name → values, in the order they were sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(BTreeMap<String, Vec<String>>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` string (a URL query
    /// or a form body).
    pub fn parse(input: &str) -> Self {
        let mut params = Parameters::new();
        for (name, value) in url::form_urlencoded::parse(input.as_bytes()) {
            params.append(name.into_owned(), value.into_owned());
        }
        params
    }

    /// True if the parameter was sent at least once.
    pub fn exists(&self, name: &str) -> bool {
        self.0.get(name).is_some_and(|values| !values.is_empty())
    }

    /// Sorted parameter names.
    pub fn names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// First value for the parameter, or `""`.
    pub fn param(&self, name: &str) -> &str {
        self.every_param(name)
            .first()
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All values for the parameter, possibly empty.
    pub fn every_param(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(value.into());
    }

    /// Put every value of `other` in front of the values already here.
    pub fn prepend(&mut self, other: &Parameters) {
        for (name, values) in &other.0 {
            let existing = self.0.entry(name.clone()).or_default();
            let mut merged = values.clone();
            merged.append(existing);
            *existing = merged;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Parameters {
    fn from(entries: [(K, V); N]) -> Self {
        let mut params = Parameters::new();
        for (name, value) in entries {
            params.append(name, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let params = Parameters::parse("bar=baz&fizz=no&fizz=maybe&name=Philip+J.+Fry");
        assert_eq!(params.param("bar"), "baz");
        assert_eq!(params.every_param("fizz"), ["no", "maybe"]);
        assert_eq!(params.param("name"), "Philip J. Fry");
        assert_eq!(params.names(), vec!["bar", "fizz", "name"]);
    }

    #[test]
    fn test_missing() {
        let params = Parameters::new();
        assert!(!params.exists("foo"));
        assert_eq!(params.param("foo"), "");
        assert!(params.every_param("foo").is_empty());
    }

    #[test]
    fn test_prepend_puts_other_first() {
        let mut combined = Parameters::parse("fizz=no&bar=baz");
        combined.prepend(&Parameters::parse("fizz=buzz"));

        assert_eq!(combined.param("fizz"), "buzz");
        assert_eq!(combined.every_param("fizz"), ["buzz", "no"]);
        assert_eq!(combined.param("bar"), "baz");
    }
}
