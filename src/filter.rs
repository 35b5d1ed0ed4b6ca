/// Survivors of one filter step together with how many items it removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Filtered<T> {
    pub kept: Vec<T>,
    pub removed: usize,
}

impl<T> Filtered<T> {
    /// Keep the items matching `keep`, preserving input order.
    pub fn retain(items: Vec<T>, mut keep: impl FnMut(&T) -> bool) -> Self {
        let before = items.len();
        let kept: Vec<T> = items.into_iter().filter(|item| keep(item)).collect();
        let removed = before - kept.len();
        Self { kept, removed }
    }

    pub fn total(&self) -> usize {
        self.kept.len() + self.removed
    }
}
