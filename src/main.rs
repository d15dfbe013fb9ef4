//! Command-line runner: extract one saved listing page and print it as JSON
//!
//! Usage: `ml-listing-extractor <snapshot.html> [url] [--raw]`

use anyhow::{Context, Result, bail};
use tracing::info;

use ml_listing_extractor::infrastructure::{AppConfig, init_logging_with_config};
use ml_listing_extractor::{ListingResolver, StaticPage};

const USAGE: &str = "usage: ml-listing-extractor <snapshot.html> [url] [--raw]";

struct Args {
    snapshot: String,
    url: Option<String>,
    include_raw_table: bool,
}

fn parse_args() -> Result<Args> {
    let mut positional = Vec::new();
    let mut include_raw_table = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--raw" => include_raw_table = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let Some(snapshot) = positional.next() else {
        bail!(USAGE);
    };
    Ok(Args {
        snapshot,
        url: positional.next(),
        include_raw_table,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;
    let config = AppConfig::load().context("loading configuration")?;
    init_logging_with_config(&config.logging)?;

    let html = tokio::fs::read_to_string(&args.snapshot)
        .await
        .with_context(|| format!("reading {}", args.snapshot))?;
    let url = args.url.unwrap_or_else(|| format!("file://{}", args.snapshot));
    info!("Extracting {} ({} bytes)", url, html.len());

    let resolver = ListingResolver::new(&config.parsing)?;
    let page = StaticPage::new(url, &html);
    let record = resolver.resolve(&page, None, args.include_raw_table).await;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
