pub mod broker;
pub mod letters;
pub mod menu;
pub mod profile;
pub mod report;
pub mod services;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config;
use crate::quotes::remote::RemoteQuotes;
use crate::quotes::{self, QuoteCache, QuoteSources, RemoteOutcome};
use crate::report::ReportFormat;
use crate::services::ServiceSelection;
use crate::session::Session;
use crate::store::BrokerStore;

#[derive(Parser)]
#[command(
    name = "data-scrubber",
    version,
    about = "Work through data-broker opt-outs, skipping the ones your removal services already cover"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Whose broker list to use (each user gets their own file)
    #[arg(long, global = true, env = "DATA_SCRUBBER_USER")]
    pub user: Option<String>,

    /// Never fetch quotes from the network
    #[arg(long, global = true)]
    pub offline: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Interactive menu (the default)
    Menu,
    /// Choose which removal services you use
    Setup,
    /// Show or edit your removal services
    Services {
        #[command(subcommand)]
        command: ServicesCommand,
    },
    /// List, add and work through data brokers
    Broker {
        #[command(subcommand)]
        command: BrokerCommand,
    },
    /// Manage the personal details used in opt-out requests
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Print a motivational quote
    Quote,
    /// Open the free helper sites you selected
    Helpers,
    /// Write privacy-request emails for pending brokers with an `email` column
    Letters {
        /// Directory for the drafts
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate a progress report
    Report {
        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Terminal)]
        format: ReportFormat,
        /// Output file path (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ServicesCommand {
    /// Show selected services
    List,
    /// Add a service
    Add {
        name: String,
        /// Treat it as a free helper rather than a paid service
        #[arg(long)]
        free: bool,
    },
    /// Remove a service
    Remove { name: String },
}

#[derive(Subcommand)]
pub enum BrokerCommand {
    /// Show pending and handled brokers
    List,
    /// Add a broker to your list
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        link: String,
    },
    /// Open a pending broker's opt-out page and confirm completion
    Open {
        /// Position in the pending list (prompted if omitted)
        #[arg(long)]
        index: Option<usize>,
    },
    /// Copy your broker list to another file
    Export { path: PathBuf },
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Enter and store your personal details
    Collect,
    /// Show a masked summary of the stored details
    Show,
}

/// Paths and options shared by every command.
pub struct Context {
    pub data_dir: PathBuf,
    pub user_name: String,
    pub offline: bool,
}

impl Context {
    pub fn services_path(&self) -> PathBuf {
        self.data_dir.join(config::SERVICES_FILE)
    }

    pub fn brokers_path(&self) -> PathBuf {
        config::brokers_path(&self.data_dir, &self.user_name)
    }

    /// The saved selection, or an empty one with a hint to run setup.
    pub fn services(&self) -> anyhow::Result<ServiceSelection> {
        match ServiceSelection::load(&self.services_path())? {
            Some(s) => Ok(s),
            None => {
                println!("No services configured yet. Run `data-scrubber setup` to choose them.");
                Ok(ServiceSelection::default())
            }
        }
    }

    pub fn open_session(&self, services: ServiceSelection) -> anyhow::Result<Session> {
        let store = BrokerStore::new(self.brokers_path());
        Ok(Session::start(&self.user_name, services, store)?)
    }

    pub async fn quotes(&self) -> QuoteCache {
        let builtin = self.data_dir.join(config::BUILTIN_QUOTES_FILE);
        if let Err(e) = quotes::seed_builtin(&builtin) {
            tracing::warn!("Could not seed quotes: {e}");
        }
        let sources = QuoteSources {
            builtin,
            custom: Some(self.data_dir.join(config::CUSTOM_QUOTES_FILE)),
        };

        let remote = if self.offline {
            None
        } else {
            RemoteQuotes::new()
                .inspect_err(|e| tracing::warn!("Quote client unavailable: {e}"))
                .ok()
        };
        let fetcher = remote.as_ref().map(|r| r as &dyn quotes::remote::QuoteFetcher);
        let cache = QuoteCache::build(&sources, fetcher).await;
        if let RemoteOutcome::Degraded(reason) = cache.remote() {
            tracing::info!("Using offline quotes only ({reason})");
        }
        cache
    }
}

pub fn show_quote(cache: &QuoteCache) {
    match cache.pick() {
        Ok(quote) => println!("\n🗣️  Inspiration:\n{quote}\n"),
        Err(e) => tracing::debug!("Skipping quote: {e}"),
    }
}

pub async fn quote(ctx: &Context) -> anyhow::Result<()> {
    let cache = ctx.quotes().await;
    if cache.is_empty() {
        println!("No quotes available.");
    }
    show_quote(&cache);
    Ok(())
}
