use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use readably_core::{
    ClientConfig, DEFAULT_ENDPOINT, JsonConfig, MarkdownConfig, OutputFormat, ReadabilityClient, ReadabilityError,
    RenderOptions, TextConfig, TracingSink, render,
};
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Extract article content through the Readability Parser API
#[derive(Parser, Debug)]
#[command(name = "readably")]
#[command(version)]
#[command(about = "Extract article content through the Readability Parser API", long_about = None)]
struct Args {
    /// URL of the page to extract
    #[arg(value_name = "URL")]
    url: String,

    /// Readability API token
    #[arg(short, long, env = "READABILITY_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    token: String,

    /// Send pre-fetched HTML from a file, or "-" for stdin
    #[arg(short, long, value_name = "FILE")]
    content: Option<String>,

    /// Output format (json, html, markdown, text)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Include TOML frontmatter (Markdown only)
    #[arg(long)]
    frontmatter: bool,

    /// Start Markdown output with the title as a heading
    #[arg(long)]
    title_heading: bool,

    /// Include reference table with all links (Markdown only)
    #[arg(long)]
    references: bool,

    /// Include a title/author header (text only)
    #[arg(long)]
    header: bool,

    /// Extraction endpoint
    #[arg(long, env = "READABILITY_ENDPOINT", default_value = DEFAULT_ENDPOINT, value_name = "URL")]
    endpoint: String,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for API requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Log raw responses of failed requests
    #[arg(long)]
    dump_failures: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(args: &Args) {
    let default = if args.verbose {
        "readably_core=debug,readably=debug"
    } else if args.dump_failures {
        "readably::dump=warn,error"
    } else {
        "error"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn read_content(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read content from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(source).with_context(|| format!("Failed to read content file: {}", source))
    }
}

fn client_config(args: &Args) -> ClientConfig {
    let defaults = ClientConfig::default();
    ClientConfig {
        endpoint: args.endpoint.clone(),
        timeout: args.timeout,
        user_agent: args.user_agent.clone().unwrap_or(defaults.user_agent),
    }
}

fn build_client(args: &Args) -> anyhow::Result<ReadabilityClient> {
    let config = client_config(args);
    tracing::debug!(
        endpoint = %config.endpoint,
        timeout = config.timeout,
        user_agent = %config.user_agent,
        "configuring client"
    );

    let mut builder = ReadabilityClient::builder(args.token.clone()).config(config);

    if args.dump_failures {
        builder = builder.diagnostic_sink(TracingSink);
    }

    builder.build().context("Failed to configure extraction client")
}

fn render_options(args: &Args) -> RenderOptions {
    RenderOptions {
        json: JsonConfig { pretty: !args.compact },
        markdown: MarkdownConfig {
            include_frontmatter: args.frontmatter,
            include_references: args.references,
            include_title_heading: args.title_heading,
        },
        text: TextConfig { preserve_paragraphs: true, include_header: args.header },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args);

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let content = match &args.content {
        Some(source) => {
            if args.verbose {
                let from = if source == "-" { "stdin".to_string() } else { source.clone() };
                echo::print_step(1, 3, &format!("Reading content from {}", from.bright_white()));
            }
            let content = read_content(source)?;
            tracing::debug!(source = %source, bytes = content.len(), "read pre-fetched content");
            if args.verbose {
                echo::print_field("Size", &echo::format_size(content.len()));
                eprintln!();
            }
            Some(content)
        }
        None => None,
    };

    let client = build_client(&args)?;

    if args.verbose {
        echo::print_step(2, 3, &format!("Extracting {}", args.url.bright_white().underline()));
    }

    let started = Instant::now();
    let result = match &content {
        Some(content) => client.extract_with_content(&args.url, content).await,
        None => client.extract(&args.url).await,
    };

    let elapsed = started.elapsed();
    let article = match result {
        Ok(article) => {
            tracing::debug!(?elapsed, "extraction request finished");
            article
        }
        Err(err) => {
            tracing::debug!(?elapsed, error = %err, "extraction request failed");
            report_failure(&err);
            return Err(err).context("Extraction failed");
        }
    };

    if args.verbose {
        echo::print_timing("Request", elapsed);
        echo::print_article_details(&article);
    }

    if let Some(next) = &article.next_page_id {
        echo::print_info(&format!(
            "Rendered {} of {} pages; next page id: {}",
            article.rendered_pages, article.total_pages, next
        ));
    }

    let output = render(&article, args.format, &render_options(&args)).context("Failed to render output")?;
    tracing::debug!(format = ?args.format, bytes = output.len(), "rendered output");

    if args.verbose {
        echo::print_step(3, 3, "Writing output");
        echo::print_field("Format", &format!("{:?}", args.format));
        eprintln!();
    }

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output.trim_end());
        }
    }

    Ok(())
}

/// Adds a hint for the failures a user can act on.
fn report_failure(err: &ReadabilityError) {
    match err {
        ReadabilityError::Transient { .. } => {
            echo::print_warning("The extraction service had a temporary problem; retrying later may succeed")
        }
        ReadabilityError::Timeout { .. } => {
            echo::print_warning("The extraction service could not fetch the page in time; try --content")
        }
        ReadabilityError::Http { status: 401 | 403, .. } => echo::print_error("The API token was rejected"),
        _ => {}
    }
}
