//! Sitecheck CLI entry point.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use sitecheck_runtime::cli::{
    checklist_cmd, export_cmd, import_cmd, issue_cmd, page_cmd, repl, serve_cmd, website_cmd,
    Context,
};
use sitecheck_runtime::config::Settings;
use sitecheck_runtime::model::WebsiteChanges;
use sitecheck_runtime::session::Fallback;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sitecheck")]
#[command(about = "Manual QA tracker: import a sitemap, test every page, export the report")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Website to act on, by name or id (defaults to the first one)
    #[arg(short, long, global = true)]
    website: Option<String>,

    /// Print machine-readable JSON to stdout
    #[arg(long, global = true)]
    json: bool,

    /// Suppress progress and confirmation output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the JSON API
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Preview the pages listed in a sitemap without saving them
    Sitemap {
        /// Sitemap URL, fetched as given
        url: String,
    },

    /// Manage websites
    #[command(subcommand)]
    Website(WebsiteCommands),

    /// Import pages from the website's sitemap
    Import {
        /// Sitemap URL (defaults to the website's sitemap or base URL)
        url: Option<String>,

        /// Pages to create when the sitemap yields nothing (none, home, common)
        #[arg(long, default_value = "none")]
        fallback: String,
    },

    /// Show the page grid with per-category status
    Pages,

    /// Manage pages
    #[command(subcommand)]
    Page(PageCommands),

    /// Show the checklist for one page
    Checklist {
        /// Grid row number or page id
        page: String,
    },

    /// Record a test result
    Test {
        /// Grid row number or page id
        page: String,

        /// Test item id (e.g. visual-1) or category name
        test_type: String,

        /// ok, not-ok or pending
        status: String,

        /// Free-text notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Log and track issues
    #[command(subcommand)]
    Issue(IssueCommands),

    /// Export a report
    Export {
        /// xlsx, csv or json
        #[arg(short, long, default_value = "xlsx")]
        format: String,

        /// Output file or directory (defaults to export.out_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the standard test items
    Catalog,

    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum WebsiteCommands {
    /// Create a website and select it
    Add {
        name: String,
        base_url: String,
        /// Sitemap URL, if known
        #[arg(short, long)]
        sitemap: Option<String>,
    },
    /// List websites
    List,
    /// Edit the selected website
    Edit {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        url: Option<String>,
        /// Empty string clears the sitemap URL
        #[arg(long)]
        sitemap: Option<String>,
    },
    /// Delete the selected website
    Delete,
}

#[derive(Subcommand)]
enum PageCommands {
    /// Add a page by hand
    Add {
        url: String,
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Move pages to the top of the grid, in the given order
    Order {
        #[arg(required = true)]
        pages: Vec<String>,
    },
}

#[derive(Subcommand)]
enum IssueCommands {
    /// Log an issue against a page
    Add {
        /// Grid row number or page id
        page: String,
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        /// low, medium or high
        #[arg(short, long)]
        priority: Option<String>,
    },
    /// List issues for the selected website
    List {
        /// Only open issues
        #[arg(long)]
        open: bool,
    },
    /// Change an issue's status
    Status {
        /// Issue id or prefix
        id: String,
        /// open, resolved or closed
        status: String,
    },
}

fn init_tracing(cli: &Cli) {
    let default = if cli.verbose {
        "debug"
    } else if matches!(cli.command, Some(Commands::Serve { .. })) {
        "info"
    } else {
        "warn"
    };
    let mut filter = EnvFilter::from_default_env();
    for target in ["sitecheck", "sitecheck_runtime"] {
        if let Ok(directive) = format!("{target}={default}").parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn set_output_flags(cli: &Cli) {
    for (enabled, var) in [
        (cli.json, "SITECHECK_JSON"),
        (cli.quiet, "SITECHECK_QUIET"),
        (cli.no_color, "SITECHECK_NO_COLOR"),
    ] {
        if enabled {
            std::env::set_var(var, "1");
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        let ctx = Context::open(Settings::load()?, cli.website.as_deref())?;
        return repl::run(ctx).await;
    };

    match command {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "sitecheck", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Catalog => return checklist_cmd::catalog(),
        _ => {}
    }

    let mut ctx = Context::open(Settings::load()?, cli.website.as_deref())?;

    match command {
        Commands::Serve { bind } => serve_cmd::run(ctx, bind.as_deref()).await,
        Commands::Sitemap { url } => import_cmd::preview(&ctx, &url).await,
        Commands::Website(cmd) => match cmd {
            WebsiteCommands::Add {
                name,
                base_url,
                sitemap,
            } => website_cmd::add(&mut ctx, &name, &base_url, sitemap.as_deref()),
            WebsiteCommands::List => website_cmd::list(&ctx),
            WebsiteCommands::Edit { name, url, sitemap } => {
                let changes = WebsiteChanges {
                    name,
                    base_url: url,
                    sitemap_url: sitemap,
                };
                if changes.is_empty() {
                    anyhow::bail!("nothing to change (use --name, --url or --sitemap)");
                }
                website_cmd::edit(&mut ctx, &changes)
            }
            WebsiteCommands::Delete => website_cmd::delete(&mut ctx),
        },
        Commands::Import { url, fallback } => {
            let fallback: Fallback = fallback.parse()?;
            import_cmd::import(&mut ctx, url.as_deref(), fallback).await
        }
        Commands::Pages => page_cmd::grid(&ctx),
        Commands::Page(cmd) => match cmd {
            PageCommands::Add { url, title } => page_cmd::add(&mut ctx, &url, title.as_deref()),
            PageCommands::Order { pages } => page_cmd::reorder(&mut ctx, &pages),
        },
        Commands::Checklist { page } => checklist_cmd::show(&ctx, &page),
        Commands::Test {
            page,
            test_type,
            status,
            notes,
        } => checklist_cmd::record(&mut ctx, &page, &test_type, status.parse()?, notes.as_deref()),
        Commands::Issue(cmd) => match cmd {
            IssueCommands::Add {
                page,
                title,
                description,
                priority,
            } => {
                let priority = priority.map(|p| p.parse()).transpose()?;
                issue_cmd::add(&mut ctx, &page, &title, description.as_deref(), priority)
            }
            IssueCommands::List { open } => issue_cmd::list(&ctx, open),
            IssueCommands::Status { id, status } => {
                issue_cmd::set_status(&mut ctx, &id, status.parse()?)
            }
        },
        Commands::Export { format, output } => {
            export_cmd::run(&ctx, format.parse()?, output.as_deref())
        }
        Commands::Catalog | Commands::Completions { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    set_output_flags(&cli);
    init_tracing(&cli);

    if let Err(e) = run(cli).await {
        let s = sitecheck_runtime::cli::output::Styled::new();
        eprintln!("  {} {e:#}", s.fail_sym());
        std::process::exit(1);
    }
}
