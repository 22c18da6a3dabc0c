/// Ordered mapping from a literal marker to its replacement.
///
/// Insertion order is substitution order: each entry becomes one stage of the
/// replace chain and scans the output of the stage before it. A marker without
/// a replacement (`None`) produces no stage and is left in the output as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: Vec<(String, Option<String>)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a marker.
    ///
    /// Updating keeps the marker's original position in the chain.
    pub fn insert(
        &mut self,
        marker: impl Into<String>,
        replacement: impl Into<Option<String>>,
    ) -> &mut Self {
        let marker = marker.into();
        let replacement = replacement.into();
        match self.entries.iter_mut().find(|(m, _)| *m == marker) {
            Some(entry) => entry.1 = replacement,
            None => self.entries.push((marker, replacement)),
        }
        self
    }

    pub fn get(&self, marker: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(m, _)| m == marker)
            .and_then(|(_, r)| r.as_deref())
    }

    /// Entries in substitution order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(m, r)| (m.as_str(), r.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M, R> FromIterator<(M, R)> for PlaceholderMap
where
    M: Into<String>,
    R: Into<Option<String>>,
{
    fn from_iter<T: IntoIterator<Item = (M, R)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (marker, replacement) in iter {
            map.insert(marker, replacement);
        }
        map
    }
}
