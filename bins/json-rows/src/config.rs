use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use codec_json_event::JsonEventConfig;
use row_api::RecordType;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "json-rows", about = "Декодирование JSON документов в типизированные строки таблицы")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Декодировать NDJSON, одна строка таблицы на строку ввода
    Decode(DecodeArgs),
    /// Показать разобранную схему таблицы
    Schema(SchemaArgs),
}

#[derive(Args, Clone, Debug)]
pub struct DecodeArgs {
    /// Путь к TOML описанию таблицы
    #[arg(long, default_value = "table.toml", env = "TABLE_CONFIG")]
    pub table: String,
    /// Входной файл (по умолчанию stdin)
    #[arg(long)]
    pub input: Option<PathBuf>,
    /// Что делать с документом, который не удалось декодировать
    #[arg(long, value_enum, default_value_t = OnError::Skip)]
    pub on_error: OnError,
}

#[derive(Args, Clone, Debug)]
pub struct SchemaArgs {
    /// Путь к TOML описанию таблицы
    #[arg(long, default_value = "table.toml", env = "TABLE_CONFIG")]
    pub table: String,
}

/// Политика для плохих документов. Ошибки схемы всегда прерывают работу.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnError {
    /// Залогировать ошибку и перейти к следующему документу
    Skip,
    /// Остановиться на первой ошибке
    Fail,
}

// ---- TOML table definition ----

/// ```toml
/// name = "events"
/// columns = "uuid,host,ts,count"
/// column_types = "string,string,string,int"
///
/// [decoder]
/// payload_key = "data"
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    #[serde(default = "default_table_name")]
    pub name: String,
    /// Имена колонок через запятую.
    pub columns: String,
    /// Типы колонок, например `bigint,array<string>`.
    pub column_types: String,
    #[serde(default)]
    pub decoder: JsonEventConfig,
}

fn default_table_name() -> String {
    "unnamed".into()
}

impl TableConfig {
    pub fn load(path: &str) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::Config {
            context: "read",
            detail: format!("'{path}': {e}"),
        })?;
        Self::parse(&content).map_err(|e| match e {
            CliError::Config { context, detail } => CliError::Config {
                context,
                detail: format!("'{path}': {detail}"),
            },
            other => other,
        })
    }

    pub fn parse(toml_str: &str) -> Result<Self, CliError> {
        let table: Self = toml::from_str(toml_str).map_err(|e| CliError::Config {
            context: "parse",
            detail: e.to_string(),
        })?;
        table.decoder.validate()?;
        Ok(table)
    }

    pub fn schema(&self) -> Result<RecordType, CliError> {
        Ok(RecordType::from_columns(&self.columns, &self.column_types)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codec_json_event::{DecoderMode, ReservedKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_table_with_decoder_section() {
        let table = TableConfig::parse(
            r#"
            name = "events"
            columns = "uuid,ts,tags"
            column_types = "string,string,map<string,string>"

            [decoder]
            payload_key = "body"

            [[decoder.reserved]]
            kind = "timestamp"
            column = "ts"
            source = "time"
            "#,
        )
        .unwrap();

        assert_eq!(table.name, "events");
        assert_eq!(table.decoder.payload_key, "body");
        assert_eq!(table.decoder.reserved.len(), 1);
        assert_eq!(table.decoder.reserved[0].kind, ReservedKind::Timestamp);

        let schema = table.schema().unwrap();
        assert_eq!(schema.field_names(), ["uuid", "ts", "tags"]);
    }

    #[test]
    fn decoder_section_is_optional() {
        let table = TableConfig::parse("columns = \"a\"\ncolumn_types = \"int\"").unwrap();
        assert_eq!(table.name, "unnamed");
        assert_eq!(table.decoder.mode, DecoderMode::Event);
        assert_eq!(table.decoder, JsonEventConfig::default());
    }

    #[test]
    fn schema_errors_surface() {
        let table = TableConfig::parse("columns = \"a,b\"\ncolumn_types = \"int\"").unwrap();
        assert!(matches!(table.schema(), Err(CliError::Schema(_))));
    }

    #[test]
    fn missing_columns_is_a_config_error() {
        assert!(matches!(
            TableConfig::parse("column_types = \"int\""),
            Err(CliError::Config { context: "parse", .. })
        ));
    }
}
