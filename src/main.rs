mod config;
mod dump;
mod error;
mod fetch;
mod output;
mod parser;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use tracing::{info, warn};

use parser::extract::{Extractor, SectionResults};
use parser::labels::SectionKind;

#[derive(Parser)]
#[command(name = "recipe_scraper", about = "Pull ingredient and instruction lists out of recipe pages")]
struct Cli {
    /// Config file (default: ./recipe_scraper.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch recipe pages and extract their lists
    Scrape {
        /// Page URLs (default: the built-in sample pages)
        urls: Vec<String>,
        /// Max concurrent requests (overrides fetch.concurrency)
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Extract lists from saved HTML files
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the parsed document tree, flagging section labels
    Dump {
        /// HTML file or http(s) URL
        source: String,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Section kinds to extract (default: all)
    #[arg(short, long = "section", value_enum)]
    sections: Vec<SectionKind>,
    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

impl OutputArgs {
    fn kinds(&self) -> Vec<SectionKind> {
        if self.sections.is_empty() {
            SectionKind::ALL.to_vec()
        } else {
            let mut kinds = self.sections.clone();
            kinds.sort();
            kinds.dedup();
            kinds
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = config::load(cli.config.as_deref())?;
    let extractor = Extractor::new(&settings);

    let result = match cli.command {
        Commands::Scrape {
            urls,
            concurrency,
            output,
        } => {
            if let Some(n) = concurrency {
                settings.fetch.concurrency = n.max(1);
            }
            let urls = if urls.is_empty() {
                info!("No URLs given, using {} sample pages", fetch::SAMPLE_URLS.len());
                fetch::SAMPLE_URLS.iter().map(|u| u.to_string()).collect()
            } else {
                urls
            };

            let client = fetch::build_client(&settings.fetch)?;
            let kinds = output.kinds();
            let outcomes = fetch::scrape_pages(
                &client,
                &settings.fetch,
                Arc::new(extractor),
                &kinds,
                urls,
            )
            .await?;

            let mut pages = Vec::with_capacity(outcomes.len());
            for outcome in outcomes {
                match outcome.result {
                    Ok(results) if output.json => {
                        let mut page = output::page_json(&outcome.url, &results);
                        page["latency_ms"] = outcome.latency_ms.into();
                        pages.push(page);
                    }
                    Ok(results) => print!("{}", output::render_text(&outcome.url, &results)),
                    Err(e) if output.json => pages.push(output::failure_json(&outcome.url, &e)),
                    Err(e) => println!("==== {} ====\nFailed: {}", outcome.url, e),
                }
            }
            if output.json {
                println!("{}", serde_json::to_string_pretty(&pages)?);
            }
            Ok(())
        }
        Commands::Parse { files, output } => {
            let kinds = output.kinds();
            let results: Vec<(PathBuf, Result<SectionResults>)> = files
                .into_par_iter()
                .map(|path| {
                    let result = parse_file(&path, &extractor, &kinds);
                    (path, result)
                })
                .collect();

            let mut pages = Vec::with_capacity(results.len());
            for (path, result) in results {
                let source = path.display().to_string();
                match result {
                    Ok(sections) if output.json => pages.push(output::page_json(&source, &sections)),
                    Ok(sections) => print!("{}", output::render_text(&source, &sections)),
                    Err(e) => {
                        warn!("{:#}", e);
                        if output.json {
                            pages.push(output::failure_json(&source, &format!("{:#}", e)));
                        }
                    }
                }
            }
            if output.json {
                println!("{}", serde_json::to_string_pretty(&pages)?);
            }
            Ok(())
        }
        Commands::Dump { source } => {
            let html = if source.starts_with("http://") || source.starts_with("https://") {
                let client = fetch::build_client(&settings.fetch)?;
                fetch::fetch_page(&client, &source).await?
            } else {
                std::fs::read_to_string(&source)
                    .with_context(|| format!("Failed to read HTML file: {}", source))?
            };
            let doc = scraper::Html::parse_document(&html);
            let stdout = std::io::stdout();
            dump::dump_tree(&doc, &extractor, &mut stdout.lock())?;
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!("Done in {}", format_duration(elapsed));
    }

    result
}

fn parse_file(path: &Path, extractor: &Extractor, kinds: &[SectionKind]) -> Result<SectionResults> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read HTML file: {}", path.display()))?;
    Ok(parser::extract_page(&html, extractor, kinds))
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn cli_parses_sections() {
        let cli = Cli::try_parse_from([
            "recipe_scraper",
            "parse",
            "a.html",
            "--section",
            "instructions",
            "-s",
            "ingredients",
            "-s",
            "instructions",
        ])
        .unwrap();
        let Commands::Parse { files, output } = cli.command else {
            panic!("expected parse");
        };
        assert_eq!(files, vec![PathBuf::from("a.html")]);
        assert_eq!(output.kinds(), vec![SectionKind::Ingredients, SectionKind::Instructions]);
    }

    #[test]
    fn parse_requires_files() {
        assert!(Cli::try_parse_from(["recipe_scraper", "parse"]).is_err());
    }

    #[test]
    fn scrape_defaults() {
        let cli = Cli::try_parse_from(["recipe_scraper", "scrape"]).unwrap();
        let Commands::Scrape { urls, concurrency, output } = cli.command else {
            panic!("expected scrape");
        };
        assert!(urls.is_empty());
        assert!(concurrency.is_none());
        assert!(!output.json);
        assert_eq!(output.kinds(), SectionKind::ALL.to_vec());
    }

    #[test]
    fn parse_file_fixture() {
        let sections = parse_file(
            Path::new("tests/fixtures/two_recipes.html"),
            &Extractor::default(),
            &[SectionKind::Ingredients],
        )
        .unwrap();
        assert_eq!(sections[&SectionKind::Ingredients].as_ref().unwrap().len(), 2);
    }

    #[test]
    fn parse_file_missing() {
        let err = parse_file(Path::new("tests/fixtures/nope.html"), &Extractor::default(), &SectionKind::ALL)
            .unwrap_err();
        assert!(err.to_string().contains("nope.html"));
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }
}
