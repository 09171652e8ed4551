//! Store population tool.
//!
//! Builds a redirect store file from a JSON document mapping hostnames to
//! records:
//!
//! ```json
//! {
//!   "example.com": { "status": 301, "location": "https://www.example.com" },
//!   "old.example.org": { "status": 302, "location": "/new" }
//! }
//! ```
//!
//! The server only ever reads the store; this tool is the write path,
//! run before (and outside of) the serving process.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::process;

use clap::Parser;
use serde::Deserialize;

use redirector::record;
use redirector::store::StoreBuilder;

#[derive(Parser, Debug)]
#[command(name = "redirector-mkstore")]
#[command(about = "Build a redirect store file from a JSON record map")]
#[command(version)]
struct Args {
    /// JSON file mapping hostname to { status, location }
    input: String,

    /// Store file to write
    output: String,
}

#[derive(Debug, Deserialize)]
struct RecordSpec {
    status: u16,
    location: String,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let input = File::open(&args.input)?;
    let records: BTreeMap<String, RecordSpec> = serde_json::from_reader(BufReader::new(input))?;

    let mut builder = StoreBuilder::create(Path::new(&args.output))?;
    for (host, spec) in &records {
        let value = record::encode(spec.status, &spec.location)
            .map_err(|e| format!("record for {host}: {e}"))?;
        builder.add(host.as_bytes(), &value)?;
    }
    let count = builder.finish()?;

    println!("{count} records written to {}", args.output);
    Ok(())
}
