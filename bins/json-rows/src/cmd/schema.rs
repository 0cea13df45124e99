use crate::config::{SchemaArgs, TableConfig};
use crate::error::CliError;

pub fn run(args: SchemaArgs) -> Result<(), CliError> {
    let table = TableConfig::load(&args.table)?;
    let schema = table.schema()?;

    println!("{}", table.name);
    for (slot, (name, ty)) in schema.fields().enumerate() {
        println!("  {slot}: {name} {ty}");
    }
    Ok(())
}
