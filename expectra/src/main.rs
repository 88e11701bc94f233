// expectra/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use expectra_core::ExpectraError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=expectra_core=debug expectra run  (shows rendered SQL)
    // Logs go to stderr so `validate` output stays parseable.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            project_dir,
            engine,
        } => commands::run::execute(project_dir, engine).await,
        Commands::Validate {
            data,
            table,
            column_a,
            column_b,
            row_condition,
            engine,
            result_format,
        } => {
            commands::validate::execute(commands::validate::ValidateArgs {
                data,
                table,
                column_a,
                column_b,
                row_condition,
                engine,
                result_format,
            })
            .await
        }
        Commands::List => commands::list::execute(),
        Commands::Diagnose { engine } => commands::diagnose::execute(engine).await,
        Commands::Clean { project_dir } => commands::clean::execute(project_dir),
    };

    if let Err(err) = result {
        report(err);
        std::process::exit(1);
    }
    Ok(())
}

/// Library errors are rendered through miette (code + help), anything else as a plain chain.
fn report(err: anyhow::Error) {
    let context = err.to_string();
    match err.downcast::<ExpectraError>() {
        Ok(e) => {
            let report = miette::Report::new(e);
            if context != report.to_string() {
                eprintln!("{}", context);
            }
            eprintln!("{:?}", report);
        }
        Err(err) => eprintln!("Error: {:?}", err),
    }
}
