/// Raised when a positional operation points past the end of the list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("no entry at position {index} (list holds {len})")]
    OutOfBounds { index: usize, len: usize },
}

/// Ordered entries of one document kind. An entry's identity is its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryList<T> {
    entries: Vec<T>,
}

impl<T> Default for EntryList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> EntryList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends at the end and returns the new entry's index.
    pub fn append(&mut self, entry: T) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    /// Removes the entry at `index`; later entries shift down by one.
    pub fn remove_at(&mut self, index: usize) -> Result<T, StoreError> {
        if index >= self.entries.len() {
            return Err(StoreError::OutOfBounds {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a, T> IntoIterator for &'a EntryList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
