use propschema_schema::{ConfigData, ContentDigest};
use serde::Serialize;

use crate::cmd::DigestArgs;
use crate::exit::{read_file, schema_error, CliResult, SUCCESS};
use crate::output::{print_json, table, OutputFormat};

#[derive(Serialize)]
struct DigestOutput {
    path: String,
    algorithm: String,
    digest: String,
    canonical_size: usize,
}

pub fn run(args: DigestArgs, format: OutputFormat) -> CliResult<i32> {
    let source = read_file(&args.config)?;
    let data = ConfigData::from_json(&source).map_err(|err| schema_error("invalid config", err))?;
    let canonical = data
        .canonical_bytes()
        .map_err(|err| schema_error("canonical encoding failed", err))?;
    let digest = ContentDigest::sha256(&canonical);

    let out = DigestOutput {
        path: args.config.display().to_string(),
        algorithm: digest.algorithm.to_string(),
        digest: digest.to_hex(),
        canonical_size: canonical.len(),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = table(vec!["PATH", "ALGORITHM", "DIGEST"]);
            table.add_row(vec![out.path, out.algorithm, out.digest]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}  {}", out.digest, out.path),
        OutputFormat::Raw => println!("{}", out.digest),
    }
    Ok(SUCCESS)
}
