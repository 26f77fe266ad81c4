// cargo run --bin filter-catalog -- -f dtc -o /tmp/dtc.txt starlink.txt

use clap::Parser;
use std::fs::{self, File};
use std::io::{prelude::*, BufWriter};
use std::path::PathBuf;

use overhead_lib::catalog::NameFilter;

/// Write the records of a TLE file whose names match the filter
#[derive(Parser, Debug)]
#[command(version)]
struct Opts {
    /// Case-insensitive name substring to keep, may be repeated
    #[arg(short = 'f', long = "filter")]
    filters: Vec<String>,

    /// Regular expression the name must match (alternative to --filter)
    #[arg(short = 'p', long)]
    pattern: Option<String>,

    /// Print the catalog numbers of the kept records
    #[arg(short = 'n', long)]
    numbers: bool,

    /// Output file path to write
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Three-line element set file to read
    input: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let opts = Opts::parse();

    let doc = fs::read_to_string(&opts.input)?;
    let (_, records) = elset::parse_catalog(&doc).map_err(|e| e.to_string())?;
    let parsed = records.len();

    let mut filter = NameFilter::substrings(&opts.filters);
    if let Some(p) = &opts.pattern {
        filter = filter.with_pattern(p)?;
    }
    let records = filter.apply(records);

    let mut output = BufWriter::new(File::create(&opts.output)?);
    elset::write_catalog(&records, &mut output)?;
    output.flush()?;

    if opts.numbers {
        for r in records.iter() {
            match r.catalog_number() {
                Some(n) => println!("{n:>6} {r}"),
                None => println!("     ? {r}"),
            }
        }
    }
    println!("Kept {} of {parsed} records", records.len());

    Ok(())
}
