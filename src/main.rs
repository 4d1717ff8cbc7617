//! entry-resolver — CLI entrypoint.
//! Resolves a date-encoded blog entry URL to its AtomPub entry and prints it.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use entry_resolver::{
    AtomPubClient, ClientConfig, Entry, ResolveError, Resolver, SearchTarget,
};

#[derive(Debug, Parser)]
#[command(name = "entry-resolver", version, about)]
struct Cli {
    /// Entry URL or path containing /YYYY/MM/DD/HHMMSS
    reference: String,

    /// TOML or JSON config file (otherwise $ENTRY_RESOLVER_CONFIG, config/, then env)
    #[arg(long, env = "ENTRY_RESOLVER_CONFIG")]
    config: Option<PathBuf>,

    /// Print the entry as JSON
    #[arg(long)]
    json: bool,

    /// Print only the resolved entry id, skipping the entry fetch
    #[arg(long, conflicts_with = "json")]
    id_only: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("entry_resolver=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn print_entry(entry: &Entry, json: bool) -> anyhow::Result<()> {
    if json {
        let out = serde_json::to_string_pretty(entry).context("serializing entry")?;
        println!("{out}");
        return Ok(());
    }
    println!("Title: {}", entry.title);
    println!("URL: {}", entry.url.as_deref().unwrap_or("-"));
    match entry.published_at {
        Some(ts) => println!("Published: {}", ts.to_rfc3339()),
        None => println!("Published: -"),
    }
    if entry.draft {
        println!("Draft: yes");
    }
    println!();
    println!("{}", entry.content);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cfg = match &cli.config {
        Some(path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load_default()?,
    };
    let target = SearchTarget::parse(&cli.reference)?;

    let deadline = cfg.deadline();
    let resolver = Resolver::new(AtomPubClient::new(cfg)?).with_deadline(deadline);

    if cli.id_only {
        let best = resolver.resolve(&target).await?;
        println!("{}", best.entry_id);
        return Ok(());
    }

    let entry = resolver.resolve_and_fetch(&target).await?;
    print_entry(&entry, cli.json)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            let code = e
                .downcast_ref::<ResolveError>()
                .map(ResolveError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}
