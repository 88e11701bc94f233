// expectra/src/commands/validate.rs
//
// USE CASE: Ad-hoc check of a single CSV file, printed as JSON.

use std::path::PathBuf;

use anyhow::Context;
use expectra_core::application::{RuntimeConfiguration, validate};
use expectra_core::domain::expectation::{
    ExpectationConfiguration, ExpectationRegistry, ResultFormat, UniqueWithConditionKwargs,
};
use expectra_core::domain::project::Engine;
use expectra_core::infrastructure::adapters::connect;
use expectra_core::infrastructure::compiler::JinjaRenderer;
use expectra_core::infrastructure::config::derive_dataset_name;

pub struct ValidateArgs {
    pub data: PathBuf,
    pub table: Option<String>,
    pub column_a: String,
    pub column_b: String,
    pub row_condition: Option<String>,
    pub engine: Engine,
    pub result_format: ResultFormat,
}

pub async fn execute(args: ValidateArgs) -> anyhow::Result<()> {
    if !args.data.is_file() {
        anyhow::bail!("Data file not found at: {}", args.data.display());
    }

    let table = match args.table {
        Some(table) => table,
        None => args
            .data
            .file_stem()
            .and_then(|s| s.to_str())
            .map(derive_dataset_name)
            .context("Cannot derive a table name from the data file, pass --table")?,
    };

    let connector = connect(args.engine, ":memory:")?;
    connector
        .register_source(&table, &args.data)
        .await
        .with_context(|| format!("Failed to load {}", args.data.display()))?;
    tracing::info!(table = %table, engine = %args.engine, "Ad-hoc dataset registered");

    let mut kwargs = UniqueWithConditionKwargs::new(args.column_a, args.column_b).with_batch(&table);
    if let Some(condition) = args.row_condition {
        kwargs = kwargs.with_row_condition(condition);
    }
    let config = ExpectationConfiguration::from(kwargs);

    let result = validate(
        &config,
        &ExpectationRegistry::builtin(),
        connector.as_ref(),
        &JinjaRenderer::new(),
        &RuntimeConfiguration::default().with_result_format(args.result_format),
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
