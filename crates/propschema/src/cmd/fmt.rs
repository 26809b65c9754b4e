use propschema_schema::Schema;

use crate::cmd::FmtArgs;
use crate::exit::{read_file, schema_error, CliResult, SUCCESS};
use crate::output::{print_json, print_pretty_json, OutputFormat};

pub fn run(args: FmtArgs, format: OutputFormat) -> CliResult<i32> {
    let source = read_file(&args.schema)?;
    let schema = Schema::from_json(&source).map_err(|err| schema_error("invalid schema", err))?;
    let rendered = schema.to_value();

    match format {
        OutputFormat::Json => print_json(&rendered),
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Raw => {
            print_pretty_json(&rendered)
        }
    }
    Ok(SUCCESS)
}
