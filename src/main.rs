mod cli;
mod config;
mod coverage;
mod error;
mod letters;
mod quotes;
mod report;
mod services;
mod session;
mod store;
mod vault;

use clap::Parser;
use cli::{BrokerCommand, Cli, Command, Context, ProfileCommand, ServicesCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let command = cli.command.unwrap_or(Command::Menu);
    let user_name = match cli.user {
        Some(name) => name,
        None if matches!(command, Command::Menu) => cli::menu::prompt_user_name()?,
        None => "Friend".to_string(),
    };

    let ctx = Context {
        data_dir: config::data_dir()?,
        user_name,
        offline: cli.offline,
    };
    tracing::debug!("Data directory: {}", ctx.data_dir.display());

    match command {
        Command::Menu => cli::menu::run(&ctx).await?,
        Command::Setup => {
            cli::services::setup(&ctx)?;
        }
        Command::Services { command } => match command {
            ServicesCommand::List => cli::services::list(&ctx)?,
            ServicesCommand::Add { name, free } => cli::services::add(&ctx, &name, free)?,
            ServicesCommand::Remove { name } => cli::services::remove(&ctx, &name)?,
        },
        Command::Broker { command } => {
            let mut session = ctx.open_session(ctx.services()?)?;
            match command {
                BrokerCommand::List => cli::broker::list_brokers(&session),
                BrokerCommand::Add { name, link } => {
                    cli::broker::add_broker(&mut session, &name, &link)?;
                    cli::show_quote(&ctx.quotes().await);
                }
                BrokerCommand::Open { index } => {
                    if cli::broker::open_broker(&mut session, index)? {
                        cli::show_quote(&ctx.quotes().await);
                    }
                }
                BrokerCommand::Export { path } => cli::broker::export(&session, &path)?,
            }
        }
        Command::Profile { command } => match command {
            ProfileCommand::Collect => cli::profile::collect(&ctx)?,
            ProfileCommand::Show => cli::profile::show(&ctx)?,
        },
        Command::Quote => cli::quote(&ctx).await?,
        Command::Helpers => cli::services::open_helpers(&ctx)?,
        Command::Letters { output } => {
            let session = ctx.open_session(ctx.services()?)?;
            cli::letters::write_letters(&ctx, &session, output)?;
        }
        Command::Report { format, output } => {
            let session = ctx.open_session(ctx.services()?)?;
            cli::report::generate_report(&session, format, output.as_deref())?;
        }
    }

    Ok(())
}
