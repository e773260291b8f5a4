use std::process::ExitCode;

use clap::Parser;
use molloy::{CountQuery, QueryError};
use tracing_subscriber::EnvFilter;

/// Count the sub-collections of a multiset that satisfy constraints.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    // Available items, as NAME=MAX
    #[arg(short = 'i', long = "item", value_parser = parse_item)]
    items: Vec<(String, usize)>,

    // Size of the collections, defaults to the total number of items
    #[arg(short = 's', long)]
    size: Option<usize>,

    // Constraints, e.g. "red % 2 == 0 and blue >= 2"
    #[arg(short = 'c', long)]
    constraints: Option<String>,

    // JSON query file; --item, --size and --constraints extend it
    #[arg(short = 'q', long)]
    query: Option<String>,
}

fn parse_item(arg: &str) -> Result<(String, usize), String> {
    let (name, count) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=MAX, got {arg:?}"))?;
    let count = count
        .trim()
        .parse()
        .map_err(|e| format!("invalid count for {name}: {e}"))?;
    Ok((name.trim().to_string(), count))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let query = match build_query(args) {
        Ok(query) => query,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    match query.run() {
        Ok(count) => {
            println!("{count}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_query(args: Args) -> Result<CountQuery, QueryError> {
    let mut query = match &args.query {
        Some(path) => CountQuery::load(path)?,
        None => CountQuery::default(),
    };
    query.items.extend(args.items);
    if args.size.is_some() {
        query.size = args.size;
    }
    if args.constraints.is_some() {
        query.constraints = args.constraints;
    }
    Ok(query)
}
