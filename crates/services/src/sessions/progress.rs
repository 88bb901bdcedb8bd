/// Aggregated view of the active set, useful for front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub revealed: usize,
    pub marked_correct: u32,
    pub marked_incorrect: u32,
    pub untouched: usize,
}
