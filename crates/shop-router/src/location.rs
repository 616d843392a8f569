//! In-app locations: path, query and hash.

use std::fmt;

/// A parsed in-app address such as `/orders?page=2#top`.
///
/// Query pairs keep their original order so that a location survives a
/// round trip through [`Location::full_path`] unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Normalized path: leading `/`, no trailing `/` except for the root.
    pub path: String,
    /// Decoded query pairs.
    pub query: Vec<(String, String)>,
    /// Fragment without the `#`.
    pub hash: Option<String>,
}

impl Location {
    /// Parse a full path. Missing leading slashes are added.
    pub fn parse(full_path: &str) -> Self {
        let (rest, hash) = match full_path.split_once('#') {
            Some((rest, hash)) => (rest, Some(hash.to_string())),
            None => (full_path, None),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (rest, Vec::new()),
        };
        Self {
            path: normalize_path(path),
            query,
            hash,
        }
    }

    /// Location for a bare path.
    pub fn from_path(path: &str) -> Self {
        Self {
            path: normalize_path(path),
            ..Self::default()
        }
    }

    /// Append a query pair.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// First value for `key`.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Path plus encoded query and hash.
    pub fn full_path(&self) -> String {
        let mut out = self.path.clone();
        if !self.query.is_empty() {
            out.push('?');
            let pairs: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            out.push_str(&pairs.join("&"));
        }
        if let Some(hash) = &self.hash {
            out.push('#');
            out.push_str(hash);
        }
        out
    }

    /// Non-empty path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(k), decode(v))
        })
        .collect()
}

/// Percent-decode, keeping the raw text when it is not valid UTF-8.
pub(crate) fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}
