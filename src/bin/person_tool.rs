use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use contentmodel::{
    Person, QueryResult, RowReadOptions, marshall_person, persons_from_result, unmarshall_person,
};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "person-tool")]
#[command(about = "Inspect and convert Person records")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a Person JSON object as parcel hex
    Encode {
        /// JSON file, or `-` for stdin
        input: PathBuf,
    },
    /// Decode parcel hex into Person JSON
    Decode { hex: String },
    /// Map a result-set JSON file (`{"columns":[..],"rows":[[..]]}`) to persons
    Rows {
        input: PathBuf,
        /// Only read these columns (comma separated)
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
        /// Columns are prefixed with the table name (joined queries)
        #[arg(long)]
        prefixed: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Encode { input } => encode(&input),
        Command::Decode { hex } => decode(&hex),
        Command::Rows {
            input,
            fields,
            prefixed,
        } => rows(&input, fields, prefixed),
    }
}

fn encode(input: &Path) -> Result<()> {
    let json = read_input(input)?;
    let person: Person = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse person JSON from {}", input.display()))?;
    let bytes = marshall_person(&person).context("failed to write parcel")?;
    debug!(bytes = bytes.len(), "encoded person");
    println!("{}", to_hex(&bytes));
    Ok(())
}

fn decode(hex: &str) -> Result<()> {
    let bytes = from_hex(hex)?;
    let person = unmarshall_person(&bytes).context("failed to read parcel")?;
    println!("{}", serde_json::to_string(&person)?);
    Ok(())
}

fn rows(input: &Path, fields: Option<Vec<String>>, prefixed: bool) -> Result<()> {
    let json = read_input(input)?;
    let result: QueryResult = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse result set from {}", input.display()))?;

    let mut options = RowReadOptions::new().prepend_table_name(prefixed);
    if let Some(fields) = fields {
        options = options.fields(fields);
    }

    let persons = persons_from_result(result, &options).context("failed to read rows")?;
    info!(count = persons.len(), "read persons");

    for person in &persons {
        println!(
            "{}\t{}",
            serde_json::to_string(person)?,
            person.content_values().to_json()?
        );
    }
    Ok(())
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn from_hex(hex: &str) -> Result<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err(anyhow!("hex input has odd length {}", hex.len()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| anyhow!("invalid hex at offset {}", i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let bytes = vec![0x00, 0x7f, 0xff, 0x10];
        assert_eq!(to_hex(&bytes), "007fff10");
        assert_eq!(from_hex("007fff10").unwrap(), bytes);
    }

    #[test]
    fn test_bad_hex() {
        assert!(from_hex("abc").is_err());
        assert!(from_hex("zz").is_err());
    }
}
