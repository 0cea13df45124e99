use crate::error::DecodeError;
use crate::schema::RecordType;
use crate::value::Row;

/// Runtime decoder: performs `document → Row` for one table schema.
///
/// Decode only: rows are never written back in the source format.
/// Implementations hold the schema and any lookup tables built from it;
/// they are immutable after construction and shared across threads.
pub trait RowDecoder: Send + Sync {
    /// Root record the produced rows are aligned to.
    fn schema(&self) -> &RecordType;

    /// Decode an already parsed document.
    fn decode_value(&self, document: &serde_json::Value) -> Result<Row, DecodeError>;

    /// Parse and decode one serialized document. Unparseable input is
    /// reported as `DecodeError::MalformedDocument`.
    fn decode(&self, bytes: &[u8]) -> Result<Row, DecodeError> {
        let document: serde_json::Value = serde_json::from_slice(bytes)?;
        self.decode_value(&document)
    }
}
