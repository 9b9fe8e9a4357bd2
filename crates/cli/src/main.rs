mod echo;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use threadkeep_core::{
    ArchiveConfig, ArchiveEvent, Archiver, FetchConfig, LocalizeOptions, SiteProfile, parse_http_url,
};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Back up a paginated forum thread as an offline mirror
#[derive(Parser, Debug)]
#[command(name = "threadkeep")]
#[command(author = "Threadkeep Contributors")]
#[command(version)]
#[command(about = "Back up a forum thread with its images and stylesheets", long_about = None)]
struct Args {
    /// Thread URL (page 1); prompted for when omitted
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Directory the thread folder is created in
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    output: PathBuf,

    /// Folder name to use instead of the thread title
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Retries for failed page fetches
    #[arg(long, default_value = "3", value_name = "NUM")]
    retries: u32,

    /// Only archive the first NUM pages
    #[arg(long, value_name = "NUM")]
    max_pages: Option<u32>,

    /// Keep avatars in images/ instead of images/avatars/
    #[arg(long)]
    no_avatars: bool,

    /// Leave links between thread pages pointing at the forum
    #[arg(long)]
    no_link_rewrite: bool,

    /// Do not download images
    #[arg(long)]
    no_images: bool,

    /// Do not download stylesheets
    #[arg(long)]
    no_css: bool,

    /// Site profile (JSON) with the forum's selectors and markers
    #[arg(long, value_name = "FILE")]
    profile: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Args {
    fn fetch_config(&self) -> FetchConfig {
        let defaults = FetchConfig::default();
        FetchConfig {
            timeout: self.timeout,
            user_agent: self.user_agent.clone().unwrap_or_else(|| defaults.user_agent.clone()),
            retries: self.retries,
            ..defaults
        }
    }

    fn localize_options(&self) -> LocalizeOptions {
        LocalizeOptions {
            localize_images: !self.no_images,
            localize_stylesheets: !self.no_css,
            split_avatars: !self.no_avatars,
            rewrite_links: !self.no_link_rewrite,
            ..Default::default()
        }
    }
}

/// Logs go to stderr so progress output on stdout stays clean.
fn init_logging(verbose: bool) {
    let default = if verbose { "threadkeep_core=debug,threadkeep=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Ask for the thread URL on stdin
fn prompt_for_url() -> anyhow::Result<String> {
    print!("Paste thread to backup here: ");
    io::stdout().flush().context("Failed to write prompt")?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read thread URL from stdin")?;

    let url = line.trim();
    if url.is_empty() {
        anyhow::bail!("No thread URL given");
    }
    Ok(url.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "threadkeep", &mut io::stdout());
        return Ok(());
    }

    init_logging(args.verbose);
    if args.verbose {
        echo::print_banner();
    }

    let input = match &args.url {
        Some(url) => url.clone(),
        None => prompt_for_url()?,
    };
    let url = parse_http_url(&input).context("Invalid thread URL")?;

    let profile = SiteProfile::resolve(args.profile.as_deref()).context("Failed to load site profile")?;
    tracing::debug!(?profile, "site profile");

    let mut builder = ArchiveConfig::builder(url)
        .output_dir(&args.output)
        .fetch(args.fetch_config())
        .profile(profile)
        .options(args.localize_options());
    if let Some(name) = &args.name {
        builder = builder.folder_name(name);
    }
    if let Some(max) = args.max_pages {
        builder = builder.max_pages(max);
    }

    let archiver = Archiver::new(builder.build()).context("Failed to create HTTP client")?;
    let summary = archiver
        .run(|event| match event {
            ArchiveEvent::ThreadResolved { thread, pages, .. } => echo::print_thread(thread, pages),
            ArchiveEvent::PageStarted { page, total, url } => echo::print_step(
                page,
                total,
                &format!("Fetching page {} from {}", page, url.as_str().bright_white().underline()),
            ),
            ArchiveEvent::PageWritten { report, .. } => {
                if args.verbose {
                    echo::print_page_report(report);
                }
            }
        })
        .await
        .context("Backup aborted")?;

    if args.verbose {
        echo::print_summary(&summary);
    }
    echo::print_success(&format!(
        "Full backup complete! Saved to {}",
        summary.root.display().bright_white()
    ));

    Ok(())
}
