/// A single row of the `json` table.
///
/// `value` holds the JSON text form of the stored value; decoding is left to
/// [`crate::codec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub value: String,
}

impl Record {
    /// Creates a new record from a key and an already-encoded value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
