use crate::operation::Operation;

/// Completed operations ordered by completion distance.
///
/// Ties keep insertion order. The same label may appear any number of times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationLog {
    entries: Vec<Operation>,
}

impl OperationLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: Vec<Operation>) -> Self {
        let mut log = Self { entries };
        log.sort();
        log
    }

    /// All entries, lowest distance first.
    pub fn entries(&self) -> &[Operation] {
        &self.entries
    }

    /// Iterates entries in log order.
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was logged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one operation type, in log order.
    pub fn for_label<'a, 'b>(&'a self, label: &'b str) -> impl Iterator<Item = &'a Operation> {
        self.entries.iter().filter(move |op| op.label() == label)
    }

    /// Entry with the greatest completion distance for `label`.
    pub fn latest_for(&self, label: &str) -> Option<&Operation> {
        self.entries
            .iter()
            .filter(|op| op.label() == label)
            .max_by(|a, b| a.cmp_by_distance(b))
    }

    /// True when `label` was logged at least once.
    pub fn contains_label(&self, label: &str) -> bool {
        self.for_label(label).next().is_some()
    }

    pub(crate) fn push(&mut self, op: Operation) {
        self.entries.push(op);
        self.sort();
    }

    /// Index of the first entry equal to `op` that is not in `skip`.
    pub(crate) fn position_excluding(&self, op: &Operation, skip: &[usize]) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .position(|(idx, entry)| entry == op && !skip.contains(&idx))
    }

    /// Removes the given indices, highest first so earlier indices stay valid.
    pub(crate) fn remove_indices(&mut self, mut indices: Vec<usize>) -> Vec<Operation> {
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();
        let mut removed = Vec::with_capacity(indices.len());
        for idx in indices {
            if idx < self.entries.len() {
                removed.push(self.entries.remove(idx));
            }
        }
        removed
    }

    pub(crate) fn remove_label(&mut self, label: &str) -> Vec<Operation> {
        let indices = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, op)| op.label() == label)
            .map(|(idx, _)| idx)
            .collect();
        self.remove_indices(indices)
    }

    pub(crate) fn relabel(&mut self, old: &str, new: &str) -> usize {
        let mut count = 0;
        for op in self.entries.iter_mut().filter(|op| op.label() == old) {
            op.relabel(new);
            count += 1;
        }
        count
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.cmp_by_distance(b));
    }
}
