//! Schema-directed JSON decoding into positional rows.
//!
//! Two decoders share one core ([`RecordDecoder`]):
//! - [`JsonDecoder`] decodes the whole document as the root record.
//! - [`JsonEventDecoder`] decodes the record found under a payload key and
//!   then overlays reserved metadata columns read from the document root.

pub mod coerce;
pub mod config;
pub mod decode;
pub mod names;
pub mod overlay;
pub mod path;
pub mod timestamp;

use std::sync::Arc;

use serde_json::Value as JsonValue;

use row_api::{DecodeError, RecordType, Row, RowDecoder};

pub use config::{ConfigError, DecoderMode, JsonEventConfig, ReservedColumn, ReservedKind};
pub use decode::RecordDecoder;
pub use names::{FieldMap, NameIndex};
pub use overlay::MetadataOverlay;
pub use path::FieldPath;

use coerce::json_kind;

// ═══════════════════════════════════════════════════════════════
//  JsonDecoder
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct JsonDecoder {
    core: RecordDecoder,
}

impl JsonDecoder {
    pub fn new(schema: RecordType) -> Self {
        let core = RecordDecoder::new(schema);
        tracing::debug!(
            columns = core.schema().len(),
            shapes = core.index().len(),
            "json decoder ready"
        );
        Self { core }
    }
}

impl RowDecoder for JsonDecoder {
    fn schema(&self) -> &RecordType {
        self.core.schema()
    }

    fn decode_value(&self, document: &JsonValue) -> Result<Row, DecodeError> {
        self.core.decode_root(document, &FieldPath::Root)
    }
}

// ═══════════════════════════════════════════════════════════════
//  JsonEventDecoder
// ═══════════════════════════════════════════════════════════════

/// Decoder for event documents:
///
/// ```json
/// {"uuid": "...", "host": "...", "timestamp": "2021-01-01T00:00:00.000Z",
///  "data": {"count": 7}}
/// ```
///
/// User columns come from the payload object; reserved columns present in
/// the schema come from the root keys configured in [`JsonEventConfig`].
#[derive(Debug, Clone)]
pub struct JsonEventDecoder {
    core: RecordDecoder,
    payload_key: String,
    overlay: MetadataOverlay,
}

impl JsonEventDecoder {
    pub fn new(schema: RecordType, config: &JsonEventConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let overlay = MetadataOverlay::resolve(&schema, &config.reserved)?;
        let core = RecordDecoder::new(schema);
        tracing::debug!(
            columns = core.schema().len(),
            shapes = core.index().len(),
            payload_key = %config.payload_key,
            reserved = ?overlay.active().collect::<Vec<_>>(),
            "json event decoder ready"
        );

        Ok(Self {
            core,
            payload_key: config.payload_key.clone(),
            overlay,
        })
    }

    /// Payload key `data`, reserved columns `uuid`, `host`, `ts`.
    ///
    /// Fails if one of those columns is declared with a type other than
    /// `string`.
    pub fn with_defaults(schema: RecordType) -> Result<Self, ConfigError> {
        Self::new(schema, &JsonEventConfig::default())
    }

    pub fn payload_key(&self) -> &str {
        &self.payload_key
    }

    pub fn overlay(&self) -> &MetadataOverlay {
        &self.overlay
    }
}

impl RowDecoder for JsonEventDecoder {
    fn schema(&self) -> &RecordType {
        self.core.schema()
    }

    fn decode_value(&self, document: &JsonValue) -> Result<Row, DecodeError> {
        let JsonValue::Object(root) = document else {
            return Err(DecodeError::type_mismatch("", "struct", json_kind(document)));
        };

        let payload = root
            .get(&self.payload_key)
            .ok_or_else(|| DecodeError::missing_field("", &self.payload_key))?;
        if !payload.is_object() {
            return Err(DecodeError::type_mismatch(
                &self.payload_key,
                "struct",
                json_kind(payload),
            ));
        }

        let mut row = self.core.decode_root(payload, &FieldPath::Root)?;
        self.overlay.apply(root, &mut row)?;
        Ok(row)
    }
}

/// Build the decoder selected by `config.mode`.
pub fn build_decoder(schema: RecordType, config: &JsonEventConfig) -> Result<Arc<dyn RowDecoder>, ConfigError> {
    let decoder: Arc<dyn RowDecoder> = match config.mode {
        DecoderMode::Event => Arc::new(JsonEventDecoder::new(schema, config)?),
        DecoderMode::Plain => Arc::new(JsonDecoder::new(schema)),
    };
    Ok(decoder)
}
