use http::header::HeaderName;
use http::HeaderMap;

/// Header emission order, carried as a request extension.
///
/// Names are matched case-insensitively. Headers not listed keep their
/// relative map order and follow the listed ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderOrder(Vec<String>);

impl HeaderOrder {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy `headers` into a new map whose iteration order follows this order.
    /// Multi-valued headers keep all their values.
    pub fn apply(&self, headers: &HeaderMap) -> HeaderMap {
        let mut out = HeaderMap::with_capacity(headers.len());
        for name in &self.0 {
            let Ok(name) = HeaderName::from_bytes(name.to_ascii_lowercase().as_bytes()) else {
                continue;
            };
            if out.contains_key(&name) {
                continue;
            }
            for value in headers.get_all(&name) {
                out.append(name.clone(), value.clone());
            }
        }
        for (name, value) in headers {
            if !self.contains(name) {
                out.append(name.clone(), value.clone());
            }
        }
        out
    }

    fn contains(&self, name: &HeaderName) -> bool {
        self.0
            .iter()
            .any(|n| n.eq_ignore_ascii_case(name.as_str()))
    }
}
