//! Runs an addressbook query against a JSON dump of cards.
//!
//! Usage: `abquery <query.json> <cards.json> [--config <config.json>]`
//!
//! `query.json` holds the request element tree, `cards.json` an array of
//! resources tagged `"type": "card"` or `"type": "collection"`. Matching card
//! ids are printed one per line. Set `RUST_LOG=debug` for evaluation logs.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use addressbook::{
    Candidate, Card, Element, QueryConfig, QueryError, QueryExecutor, QueryParser,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Resource {
    Card(Card),
    Collection {
        #[allow(dead_code)]
        id: String,
    },
}

struct Args {
    query: PathBuf,
    cards: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args() -> Option<Args> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            config = Some(PathBuf::from(args.next()?));
        } else {
            positional.push(PathBuf::from(arg));
        }
    }
    let [query, cards]: [PathBuf; 2] = positional.try_into().ok()?;
    Some(Args {
        query,
        cards,
        config,
    })
}

fn run(args: &Args) -> Result<Vec<String>, QueryError> {
    let config = match args.config.as_deref() {
        Some(path) => QueryConfig::load(path)?,
        None => QueryConfig::default(),
    };

    let root: Element = serde_json::from_str(&fs::read_to_string(&args.query)?)?;
    let spec = QueryParser::with_config(&config).parse_query(&root)?;

    let resources: Vec<Resource> = serde_json::from_str(&fs::read_to_string(&args.cards)?)?;
    let candidates = resources.iter().map(|resource| match resource {
        Resource::Card(card) => Candidate::Record(card),
        Resource::Collection { .. } => Candidate::Other,
    });

    let outcome = QueryExecutor::with_config(&spec, &config).run(candidates);
    log::info!(
        "{} matches, {} cards scanned, limit reached: {}",
        outcome.matches.len(),
        outcome.scanned,
        outcome.limit_reached
    );
    Ok(outcome.matches)
}

fn main() -> ExitCode {
    env_logger::init();

    let Some(args) = parse_args() else {
        eprintln!("usage: abquery <query.json> <cards.json> [--config <config.json>]");
        return ExitCode::from(64);
    };

    match run(&args) {
        Ok(matches) => {
            for id in matches {
                println!("{id}");
            }
            ExitCode::SUCCESS
        }
        Err(err) if err.is_bad_request() => {
            eprintln!("bad request: {err}");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
