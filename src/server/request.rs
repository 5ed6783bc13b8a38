use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Ordered, case-insensitive collection of request or response headers.
///
/// Header names keep the spelling they were first inserted with; lookups
/// ignore ASCII case per RFC 7230. A name may carry several values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    /// Create an empty header collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct header names
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// First value of a header (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|idx| self.entries[idx].1.first())
            .map(String::as_str)
    }

    /// All values of a header, empty if the header is missing
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        match self.position(name) {
            Some(idx) => &self.entries[idx].1,
            None => &[],
        }
    }

    /// Set a header, replacing any existing values but keeping its position
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert_all(name, vec![value.into()]);
    }

    /// Set a header to several values, replacing any existing ones
    pub fn insert_all(&mut self, name: impl Into<String>, values: Vec<String>) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1 = values,
            None => self.entries.push((name, values)),
        }
    }

    /// Add a value to a header, creating it if missing
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx].1.push(value.into()),
            None => self.entries.push((name, vec![value.into()])),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Overlay `actual` on top of `defaults`; names present in `actual` win.
    ///
    /// Default names keep their position, new names from `actual` are
    /// appended in their own order.
    #[must_use]
    pub fn merged_over(defaults: &Headers, actual: &Headers) -> Headers {
        let mut merged = defaults.clone();
        for (name, values) in actual.iter() {
            merged.insert_all(name, values.to_vec());
        }
        merged
    }

    /// JSON view: single values as strings, repeated values as arrays
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map = self
            .entries
            .iter()
            .map(|(k, v)| {
                let value = match v.as_slice() {
                    [single] => Value::String(single.clone()),
                    many => Value::Array(many.iter().cloned().map(Value::String).collect()),
                };
                (k.clone(), value)
            })
            .collect();
        Value::Object(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.append(k, v);
        }
        headers
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            match v.as_slice() {
                [single] => map.serialize_entry(k, single)?,
                many => map.serialize_entry(k, many)?,
            }
        }
        map.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header names to a string or list of strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Headers, A::Error> {
                let mut headers = Headers::new();
                while let Some((name, values)) = access.next_entry::<String, HeaderValues>()? {
                    match values {
                        HeaderValues::One(v) => headers.append(name, v),
                        HeaderValues::Many(vs) => {
                            if vs.is_empty() {
                                return Err(de::Error::custom(format!(
                                    "header '{name}' has no values"
                                )));
                            }
                            headers.insert_all(name, vs)
                        }
                    }
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

/// Query string parameters in arrival order.
///
/// `get` returns the first occurrence of a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Path and query parameters split out of a raw request target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    /// Percent-encoded path, always starting with `/`
    pub path: String,
    pub query: QueryParams,
}

/// Parse a raw request target such as `/users/1?expand=true`.
///
/// The target is resolved against `http://localhost`, so the path is
/// normalised the way a URL parser would (dot segments removed, unsafe
/// characters percent-encoded). Query parameters are form-url-decoded.
///
/// # Errors
///
/// Returns the URL parse error when the target cannot form a valid URL.
pub fn parse_request_target(target: &str) -> Result<RequestTarget, url::ParseError> {
    let parsed = url::Url::parse(&format!("http://localhost{target}"))?;
    let query: QueryParams = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    debug!(
        target = %target,
        path = %parsed.path(),
        param_count = query.0.len(),
        "Request target parsed"
    );

    Ok(RequestTarget {
        path: parsed.path().to_string(),
        query,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headers_case_insensitive_lookup() {
        let headers: Headers = [("Content-Type", "application/json"), ("X-Token", "abc")]
            .into_iter()
            .collect();
        assert_eq!(headers.get_first("content-type"), Some("application/json"));
        assert!(headers.contains_key("x-token"));
        assert!(!headers.contains_key("x-missing"));
    }

    #[test]
    fn test_headers_append_and_first_value() {
        let mut headers = Headers::new();
        headers.append("Accept", "text/html");
        headers.append("accept", "application/json");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get_first("ACCEPT"), Some("text/html"));
        assert_eq!(headers.get_all("accept").len(), 2);
    }

    #[test]
    fn test_headers_merged_over_actual_wins() {
        let defaults: Headers = [("x-a", "1"), ("x-b", "2")].into_iter().collect();
        let actual: Headers = [("X-B", "20"), ("x-c", "30")].into_iter().collect();
        let merged = Headers::merged_over(&defaults, &actual);
        assert_eq!(merged.get_first("x-a"), Some("1"));
        assert_eq!(merged.get_first("x-b"), Some("20"));
        assert_eq!(merged.get_first("x-c"), Some("30"));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_headers_json_view() {
        let mut headers = Headers::new();
        headers.insert("x-one", "1");
        headers.append("set-cookie", "a=1");
        headers.append("set-cookie", "b=2");
        assert_eq!(
            headers.to_json(),
            json!({"x-one": "1", "set-cookie": ["a=1", "b=2"]})
        );
    }

    #[test]
    fn test_headers_deserialize_from_yaml() {
        let headers: Headers =
            serde_yaml::from_str("x-one: '1'\naccept: [text/html, application/json]\n")
                .unwrap();
        assert_eq!(headers.get_first("X-One"), Some("1"));
        assert_eq!(headers.get_all("accept").len(), 2);
    }

    #[test]
    fn test_parse_request_target() {
        let target = parse_request_target("/items/42?limit=10&tag=a&tag=b").unwrap();
        assert_eq!(target.path, "/items/42");
        assert_eq!(target.query.get("limit"), Some("10"));
        assert_eq!(target.query.get("tag"), Some("a"));
        assert!(!target.query.contains("missing"));
    }

    #[test]
    fn test_parse_request_target_empty_is_root() {
        let target = parse_request_target("").unwrap();
        assert_eq!(target.path, "/");
        assert!(target.query.is_empty());
    }

    #[test]
    fn test_parse_request_target_decodes_query() {
        let target = parse_request_target("/search?q=hello%20world&x=a+b").unwrap();
        assert_eq!(target.query.get("q"), Some("hello world"));
        assert_eq!(target.query.get("x"), Some("a b"));
    }

    #[test]
    fn test_parse_request_target_rejects_bad_port() {
        assert!(parse_request_target(":99999/x").is_err());
    }
}
