pub mod decoder;
pub mod error;
pub mod schema;
pub mod type_string;
pub mod value;

pub use decoder::RowDecoder;
pub use error::{DecodeError, SchemaError};
pub use schema::{Field, MapType, RecordType, ScalarKind, TypeNode};
pub use value::{CaseInsensitiveMap, Row, Value};
