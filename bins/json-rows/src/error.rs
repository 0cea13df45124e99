#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("schema: {0}")]
    Schema(#[from] row_api::SchemaError),

    #[error("decoder: {0}")]
    Decoder(#[from] codec_json_event::ConfigError),

    #[error("line {line}: {source}")]
    Decode {
        line: usize,
        source: row_api::DecodeError,
    },

    #[error("output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
