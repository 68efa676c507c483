use std::string::FromUtf8Error;

/// A decoded query parameter value.
///
/// Grouped parsing always produces `Many`. Flattened parsing produces
/// `Single` for a key seen once and `Many` (in appearance order) for a key
/// seen more than once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Many(Vec<String>),
}

impl QueryValue {
    /// First value for this key, in appearance order.
    pub fn first(&self) -> &str {
        match self {
            QueryValue::Single(v) => v,
            // Many is never empty for a present key
            QueryValue::Many(vs) => vs.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values for this key, in appearance order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            QueryValue::Single(v) => vec![v.as_str()],
            QueryValue::Many(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

/// Parsed query parameters, keyed by decoded key.
///
/// Distinct keys keep the order of their first occurrence in the raw query
/// string. Lookups compare decoded keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// First value for `key`, or `None` if the key is absent.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).map(QueryValue::first)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-encode into a query string, repeating keys with multiple values.
    /// Re-parsing the result yields an equivalent mapping.
    pub fn encode(&self) -> String {
        let mut pairs = Vec::new();
        for (key, value) in &self.entries {
            for v in value.values() {
                pairs.push(format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(v)
                ));
            }
        }
        pairs.join("&")
    }

    fn push(&mut self, key: String, value: String, flatten: bool) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            // repeats always append; a flattened scalar promotes to [old, new]
            Some((_, QueryValue::Many(vs))) => vs.push(value),
            Some((_, slot)) => {
                let old = match std::mem::replace(slot, QueryValue::Many(Vec::new())) {
                    QueryValue::Single(old) => old,
                    QueryValue::Many(_) => unreachable!(),
                };
                *slot = QueryValue::Many(vec![old, value]);
            }
            None => {
                let entry = if flatten {
                    QueryValue::Single(value)
                } else {
                    QueryValue::Many(vec![value])
                };
                self.entries.push((key, entry));
            }
        }
    }
}

/// Parse a raw query string (leading `?` already stripped) into decoded
/// key/value parameters.
///
/// Tokens are separated by `&` and split on the first `=`; a token with no
/// `=` carries an empty value. Keys and values are percent-decoded exactly
/// once, and a decode failure propagates unmodified. With `flatten` unset
/// every key maps to a sequence of its values; with `flatten` set a key seen
/// once maps to a scalar and a repeated key maps to a sequence.
///
/// An empty input yields an empty mapping.
pub fn parse(raw_query: &str, flatten: bool) -> Result<QueryParams, FromUtf8Error> {
    let mut params = QueryParams::default();
    if raw_query.is_empty() {
        return Ok(params);
    }
    for token in raw_query.split('&') {
        let (raw_key, raw_value) = token.split_once('=').unwrap_or((token, ""));
        let key = urlencoding::decode(raw_key)?.into_owned();
        let value = urlencoding::decode(raw_value)?.into_owned();
        params.push(key, value, flatten);
    }
    Ok(params)
}
