use std::borrow::Cow;

/// How [`QueryString`] renders values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryEncoding {
    /// Values are concatenated verbatim. This is what the TWC API has always received.
    #[default]
    Raw,
    /// Values are percent-encoded.
    Percent,
}

/// Ordered `name=value` pairs.
///
/// Names are always written verbatim; only values are subject to [`QueryEncoding`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pairs.push((name.into(), value.into()));
        self
    }

    /// Overwrite the value of `name` in place, or append it.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == name) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((name, value)),
        }
        self
    }

    pub fn extend<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.pairs.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Render as `a=1&b=2`, without a leading `?`.
    pub fn render(&self, encoding: QueryEncoding) -> String {
        self.pairs
            .iter()
            .map(|(name, value)| {
                let value = match encoding {
                    QueryEncoding::Raw => Cow::Borrowed(value.as_str()),
                    QueryEncoding::Percent => urlencoding::encode(value),
                };
                format!("{name}={value}")
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
