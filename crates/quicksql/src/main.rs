mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quicksql::bench::run_bench;
use quicksql::QuickSql;

use crate::cli::{
    format_bench, format_output, format_ping, Cli, Commands, OutputFormat, DEFAULT_LOG_FILTER,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.config();
    let db = QuickSql::open(&config).await?;

    match cli.command {
        Commands::Get { key } => {
            let value = db.get(&key).await?;
            println!("{}", format_output(&value, cli.format));
        }
        Commands::Set { key, value } => {
            db.set(&key, &value).await?;
            if !cli.quiet {
                println!("Set {key}");
            }
        }
        Commands::Delete { key } => {
            db.delete(&key).await?;
            if !cli.quiet {
                println!("Deleted {key}");
            }
        }
        Commands::Add { key, delta } => {
            let value = db.add(&key, delta).await?;
            println!("{}", format_output(&value, cli.format));
        }
        Commands::Sub { key, delta } => {
            let value = db.sub(&key, delta).await?;
            println!("{}", format_output(&value, cli.format));
        }
        Commands::Mul { key, delta } => {
            let value = db.mul(&key, delta).await?;
            println!("{}", format_output(&value, cli.format));
        }
        Commands::Div { key, delta } => {
            let value = db.div(&key, delta).await?;
            println!("{}", format_output(&value, cli.format));
        }
        Commands::Ping => {
            let report = db.ping().await?;
            match cli.format {
                OutputFormat::Json => println!("{}", format_output(&report, cli.format)),
                OutputFormat::Pretty => println!("{}", format_ping(&report)),
            }
        }
        Commands::Clear => {
            let cleared = db.clear().await?;
            println!("{}", format_output(&cleared, cli.format));
        }
        Commands::Bench { count } => {
            let report = run_bench(&db, count).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", format_output(&report, cli.format)),
                OutputFormat::Pretty => println!("{}", format_bench(&report)),
            }
        }
    }

    Ok(())
}
