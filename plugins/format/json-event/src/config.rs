use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;

// ═══════════════════════════════════════════════════════════════
//  Decoder Config
// ═══════════════════════════════════════════════════════════════

/// Конфигурация декодера одной таблицы.
///
/// ```toml
/// mode = "event"
/// payload_key = "data"
///
/// [[reserved]]
/// kind = "timestamp"
/// column = "ts"
/// source = "timestamp"
/// ```
///
/// Без `reserved` используется набор по умолчанию (`uuid`, `host`, `ts`);
/// `reserved = []` отключает служебные колонки.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JsonEventConfig {
    pub mode: DecoderMode,
    /// Ключ корня с пользовательскими колонками (только режим event).
    pub payload_key: String,
    /// Колонки, заполняемые из ключей корня (только режим event).
    pub reserved: Vec<ReservedColumn>,
}

impl Default for JsonEventConfig {
    fn default() -> Self {
        Self {
            mode: DecoderMode::default(),
            payload_key: default_payload_key(),
            reserved: default_reserved(),
        }
    }
}

fn default_payload_key() -> String {
    "data".into()
}

fn default_reserved() -> Vec<ReservedColumn> {
    vec![
        ReservedColumn::new(ReservedKind::Id, "uuid", "uuid"),
        ReservedColumn::new(ReservedKind::Host, "host", "host"),
        ReservedColumn::new(ReservedKind::Timestamp, "ts", "timestamp"),
    ]
}

impl JsonEventConfig {
    /// Разобрать TOML строку и проверить.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Не более одной колонки на вид, без повторов колонок.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == DecoderMode::Event && self.payload_key.is_empty() {
            return Err(ConfigError::EmptyPayloadKey);
        }

        let mut kinds = HashSet::new();
        let mut columns = HashSet::new();
        for reserved in &self.reserved {
            if !kinds.insert(reserved.kind) {
                return Err(ConfigError::DuplicateReservedKind(reserved.kind));
            }
            if reserved.column.is_empty() || reserved.source.is_empty() {
                return Err(ConfigError::EmptyReservedName(reserved.kind));
            }
            if !columns.insert(reserved.column.to_lowercase()) {
                return Err(ConfigError::DuplicateReservedColumn(reserved.column.clone()));
            }
        }
        Ok(())
    }
}

/// `event`: колонки из payload плюс служебные колонки из корня.
/// `plain`: весь документ является корневой записью.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecoderMode {
    #[default]
    Event,
    Plain,
}

// ═══════════════════════════════════════════════════════════════
//  Reserved Columns
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservedKind {
    /// Идентификатор записи, копируется как есть.
    Id,
    /// Имя хоста-источника, копируется как есть.
    Host,
    /// Момент времени ISO-8601, переводится в `yyyy-MM-dd HH:mm:ss` UTC.
    Timestamp,
}

impl fmt::Display for ReservedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservedKind::Id => f.write_str("id"),
            ReservedKind::Host => f.write_str("host"),
            ReservedKind::Timestamp => f.write_str("timestamp"),
        }
    }
}

/// Колонка схемы, заполняемая из ключа корня документа.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReservedColumn {
    pub kind: ReservedKind,
    /// Колонка схемы, без учёта регистра.
    pub column: String,
    /// Ключ корня документа, точное совпадение.
    pub source: String,
}

impl ReservedColumn {
    pub fn new(kind: ReservedKind, column: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind,
            column: column.into(),
            source: source.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Errors
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("payload_key must not be empty")]
    EmptyPayloadKey,

    #[error("reserved column '{0}' declared more than once")]
    DuplicateReservedKind(ReservedKind),

    #[error("reserved column '{0}' needs non-empty column and source")]
    EmptyReservedName(ReservedKind),

    #[error("column '{0}' is targeted by more than one reserved column")]
    DuplicateReservedColumn(String),

    #[error("reserved column '{column}' must be declared string, found {found}")]
    ReservedColumnNotText { column: String, found: String },
}
