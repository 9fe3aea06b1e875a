use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use tubestat::{cli, config, web};

#[derive(Debug, Parser)]
#[command(name = "tubestat")]
#[command(about = "Keyword search analytics for YouTube videos")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search a keyword and print the analyzed results
    Search {
        /// Keyword to search for
        #[arg(required = true)]
        query: Vec<String>,
        /// Video type: all (default), short, long
        #[arg(long = "type")]
        video_type: Option<String>,
        /// Publish window: all (default), 7d, 30d, 90d, custom
        #[arg(long)]
        date: Option<String>,
        /// Custom range start (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// Custom range end (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Influence tiers to keep; repeat or comma-separate
        #[arg(long)]
        influence: Vec<String>,
        /// Sort field (e.g. viewCount, vph, performanceRatio)
        #[arg(long)]
        sort: Option<String>,
        /// Sort order: asc, desc
        #[arg(long)]
        order: Option<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Skip the AI trend summary
        #[arg(long)]
        no_summary: bool,
        /// Write the filtered results to a CSV file or directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Manage the stored YouTube API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Summarize past searches from the event log
    History {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
        /// Number of top queries to list
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Launch the web dashboard
    Web {
        /// Listen address (default from config, 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum KeyAction {
    /// Save a key to the credential file
    Set { key: String },
    /// Show the active key, masked
    Show,
    /// Remove the stored key
    Clear,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value by dotted key, e.g. `summarizer.model gemini-1.5-flash`
    Set { key: String, value: String },
    /// Restore the default config file
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Search {
            query,
            video_type,
            date,
            from,
            to,
            influence,
            sort,
            order,
            format,
            no_summary,
            export,
        } => {
            let opts = cli::SearchOptions {
                query: query.join(" "),
                video_type,
                date,
                from,
                to,
                influence,
                sort,
                order,
                format: cli::OutputFormat::from_str_opt(Some(&format)),
                summary: !no_summary,
                export,
            };
            cli::run_search(&opts)
        }
        Commands::Key { action } => match action {
            KeyAction::Set { key } => cli::run_key_set(&key),
            KeyAction::Show => cli::run_key_show(),
            KeyAction::Clear => cli::run_key_clear(),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
        Commands::History {
            format,
            days,
            limit,
        } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(fmt, days, limit)
        }
        Commands::Web { addr } => {
            let cfg = config::load();
            let addr = addr.unwrap_or_else(|| cfg.dashboard.addr.clone());
            web::serve(&addr, cfg)
        }
    }
}
