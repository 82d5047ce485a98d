use std::fmt;

/// A single component of a [`QueryKey`].
///
/// Optional parameters are stored as [`KeySegment::Field`] so that two
/// different optional fields holding the same text never collapse into the
/// same key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeySegment {
    Text(String),
    Number(i64),
    Field(String, String),
}

impl fmt::Display for KeySegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Field(name, value) => write!(f, "{name}={value:?}"),
        }
    }
}

impl From<&str> for KeySegment {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for KeySegment {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for KeySegment {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for KeySegment {
    fn from(value: i32) -> Self {
        Self::Number(i64::from(value))
    }
}

impl From<u32> for KeySegment {
    fn from(value: u32) -> Self {
        Self::Number(i64::from(value))
    }
}

/// Ordered tuple identifying a cached query.
///
/// The first segment is the resource name; invalidation works on prefixes, so
/// `["transactions"]` covers every transactions query.
///
/// ```rust
/// use query_cache::QueryKey;
///
/// let list = QueryKey::new("transactions").with(1u32).with(10u32);
/// assert!(list.starts_with(&QueryKey::new("transactions")));
/// assert_eq!(list.to_string(), r#"["transactions", 1, 10]"#);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeySegment>);

impl QueryKey {
    pub fn new(root: impl Into<KeySegment>) -> Self {
        Self(vec![root.into()])
    }

    #[must_use]
    pub fn with(mut self, segment: impl Into<KeySegment>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// Appends `name=value` only when `value` is present.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.0.push(KeySegment::Field(name.to_string(), value.into()));
        }
        self
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    pub fn root(&self) -> Option<&KeySegment> {
        self.0.first()
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, segment) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{segment}")?;
        }
        f.write_str("]")
    }
}
