use std::fmt::Display;

/// The storage-assigned key of one persisted row. Unlike a game's id it says
/// nothing about identity; it only addresses the row for updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle(pub(crate) i64);

impl RecordHandle {
    pub fn new(row_id: i64) -> Self {
        Self(row_id)
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl Display for RecordHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}", self.0)
    }
}
