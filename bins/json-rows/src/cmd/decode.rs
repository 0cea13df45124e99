use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use codec_json_event::build_decoder;
use row_api::RowDecoder;

use crate::config::{DecodeArgs, OnError, TableConfig};
use crate::error::CliError;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub decoded: usize,
    pub skipped: usize,
}

pub fn run(args: DecodeArgs) -> Result<(), CliError> {
    let table = TableConfig::load(&args.table)?;
    let decoder = build_decoder(table.schema()?, &table.decoder)?;
    tracing::info!(
        table = %table.name,
        columns = decoder.schema().len(),
        mode = ?table.decoder.mode,
        "loaded table"
    );

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let mut out = BufWriter::new(io::stdout().lock());

    let stats = decode_lines(decoder.as_ref(), input, &mut out, args.on_error)?;
    out.flush()?;

    tracing::info!(decoded = stats.decoded, skipped = stats.skipped, "done");
    Ok(())
}

/// Декодирует по документу на каждую непустую строку и пишет строку
/// таблицы как JSON массив.
pub fn decode_lines(
    decoder: &dyn RowDecoder,
    input: impl BufRead,
    out: &mut impl Write,
    on_error: OnError,
) -> Result<DecodeStats, CliError> {
    let mut stats = DecodeStats::default();

    for (i, line) in input.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }

        match decoder.decode(line.as_bytes()) {
            Ok(row) => {
                serde_json::to_writer(&mut *out, &row)?;
                out.write_all(b"\n")?;
                stats.decoded += 1;
            }
            Err(e) if on_error == OnError::Skip && !e.is_schema_error() => {
                tracing::warn!(line = line_no, error = %e, "skipping document");
                stats.skipped += 1;
            }
            Err(e) => return Err(CliError::Decode { line: line_no, source: e }),
        }
    }

    Ok(stats)
}
