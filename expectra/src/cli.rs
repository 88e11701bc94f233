// expectra/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use expectra_core::domain::expectation::ResultFormat;
use expectra_core::domain::project::Engine;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "expectra")]
#[command(about = "SQL-backed data quality expectations", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Runs every expectation declared in expectra.yaml
    Run {
        /// Project directory
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Overrides the engine declared in the project
        #[arg(long, env = "EXPECTRA_ENGINE")]
        engine: Option<Engine>,
    },

    /// Checks one column of a CSV file for duplicates under a condition (ad-hoc)
    Validate {
        /// CSV file to validate
        #[arg(long)]
        data: PathBuf,

        /// Table name for the file (default: sanitized file stem, `orders-2024.csv` -> `orders_2024`)
        #[arg(long)]
        table: Option<String>,

        /// Column whose values must be unique
        #[arg(long)]
        column_a: String,

        /// Boolean column or SQL expression selecting the rows to check
        #[arg(long)]
        column_b: String,

        /// Extra SQL filter applied before the check
        #[arg(long)]
        row_condition: Option<String>,

        #[arg(long, default_value = "duckdb")]
        engine: Engine,

        /// BOOLEAN_ONLY | BASIC | SUMMARY | COMPLETE
        #[arg(long, default_value = "BASIC")]
        result_format: ResultFormat,
    },

    /// Lists the registered expectations
    List,

    /// Runs the built-in examples and prints the completeness checklist
    Diagnose {
        #[arg(long, default_value = "duckdb")]
        engine: Engine,
    },

    /// Cleans build artifacts (target/ folder)
    Clean {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}
