// expectra/src/commands/run.rs
//
// USE CASE: Run the project's expectation suite.

use std::path::PathBuf;

use anyhow::Context;
use comfy_table::Table;
use expectra_core::application::{SuiteResult, run_suite};
use expectra_core::domain::expectation::ExpectationConfiguration;
use expectra_core::domain::project::{Engine, ProjectConfig};
use expectra_core::infrastructure::adapters::connect;
use expectra_core::infrastructure::compiler::JinjaRenderer;
use expectra_core::infrastructure::config::load_project_config;

pub async fn execute(project_dir: PathBuf, engine: Option<Engine>) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    println!("Loading configuration...");
    let mut config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    if let Some(engine) = engine {
        config.engine = engine;
    }
    println!("   Project: {} (v{})", config.name, config.version);
    println!("   Engine: {}", config.engine);

    // B. Instantiate the engine adapter
    let database = if config.database == ":memory:" {
        config.database.clone()
    } else {
        project_dir.join(&config.database).to_string_lossy().to_string()
    };
    let connector = connect(config.engine, &database)
        .with_context(|| format!("Failed to initialize {} engine", config.engine))?;

    // C. Run the suite (Application Layer)
    let renderer = JinjaRenderer::new();
    let suite = match run_suite(&project_dir, &config, connector.as_ref(), &renderer).await {
        Ok(suite) => suite,
        Err(e) => {
            eprintln!("\nCRITICAL SUITE ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", summary_table(&config, &suite));

    let stats = &suite.statistics;
    if suite.success {
        println!(
            "\nSUCCESS! {} expectation(s) passed in {:.2?}",
            stats.evaluated_expectations,
            start.elapsed()
        );
    } else {
        eprintln!(
            "\nFAILURE. {} of {} expectation(s) failed.",
            stats.unsuccessful_expectations, stats.evaluated_expectations
        );
        // Exit with error code for CI/CD
        std::process::exit(1);
    }

    Ok(())
}

fn summary_table(config: &ProjectConfig, suite: &SuiteResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Expectation", "Column", "Condition", "Status", "Duplicates"]);

    for (i, (declared, result)) in config.expectations.iter().zip(&suite.results).enumerate() {
        let ExpectationConfiguration::ExpectQueriedColumnToBeUniqueWithCondition(kwargs) = declared;
        let status = if result.exception_info.raised_exception {
            "ERROR"
        } else if result.success {
            "PASS"
        } else {
            "FAIL"
        };
        let duplicates = result
            .observed_value()
            .map(|rows| rows.len().to_string())
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            (i + 1).to_string(),
            result.expectation_type.clone(),
            kwargs.column_a.clone(),
            kwargs.column_b.clone(),
            status.to_string(),
            duplicates,
        ]);
    }
    table
}
