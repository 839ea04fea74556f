//! Options for a key conversion call.

use regex::Regex;

use crate::case::CamelCaseOptions;

/// Keys that keep their original spelling.
#[derive(Debug, Clone)]
pub enum KeyMatcher {
    /// Exact string equality.
    Exact(String),
    /// Regular expression; matches anywhere in the key unless anchored.
    Pattern(Regex),
}

impl KeyMatcher {
    pub fn exact(key: impl Into<String>) -> Self {
        Self::Exact(key.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == key,
            Self::Pattern(regex) => regex.is_match(key),
        }
    }
}

impl From<&str> for KeyMatcher {
    fn from(key: &str) -> Self {
        Self::exact(key)
    }
}

impl From<String> for KeyMatcher {
    fn from(key: String) -> Self {
        Self::Exact(key)
    }
}

impl From<Regex> for KeyMatcher {
    fn from(regex: Regex) -> Self {
        Self::Pattern(regex)
    }
}

/// A path below which keys are left untouched.
///
/// Paths are compared segment by segment. [`StopPath::parse`] splits on every
/// `.`, so a key that itself contains a dot can only be targeted with
/// [`StopPath::from_segments`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StopPath(Vec<String>);

impl StopPath {
    /// Parse dot notation: `"a_c.c_e"` → `["a_c", "c_e"]`
    pub fn parse(path: &str) -> Self {
        Self(path.split('.').map(str::to_string).collect())
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for StopPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl std::fmt::Display for StopPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Options applied uniformly to a whole [`convert_keys`](super::KeyCaseTransformer::convert_keys) traversal.
#[derive(Debug, Clone, Default)]
pub struct KeyCaseOptions {
    pub exclude: Vec<KeyMatcher>,
    pub deep: bool,
    pub pascal_case: bool,
    pub preserve_consecutive_uppercase: bool,
    pub stop_paths: Vec<StopPath>,
}

impl KeyCaseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recurse into nested objects and arrays.
    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn pascal_case(mut self, pascal_case: bool) -> Self {
        self.pascal_case = pascal_case;
        self
    }

    pub fn preserve_consecutive_uppercase(mut self, preserve: bool) -> Self {
        self.preserve_consecutive_uppercase = preserve;
        self
    }

    pub fn exclude(mut self, matcher: impl Into<KeyMatcher>) -> Self {
        self.exclude.push(matcher.into());
        self
    }

    pub fn stop_path(mut self, path: impl Into<StopPath>) -> Self {
        self.stop_paths.push(path.into());
        self
    }

    pub fn stop_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<StopPath>,
    {
        self.stop_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn is_excluded(&self, key: &str) -> bool {
        self.exclude.iter().any(|matcher| matcher.matches(key))
    }

    pub fn is_stop_path(&self, path: &[String]) -> bool {
        self.stop_paths.iter().any(|stop| stop.segments() == path)
    }

    pub fn has_stop_paths(&self) -> bool {
        !self.stop_paths.is_empty()
    }

    pub fn case_options(&self) -> CamelCaseOptions {
        CamelCaseOptions {
            pascal_case: self.pascal_case,
            preserve_consecutive_uppercase: self.preserve_consecutive_uppercase,
        }
    }
}
