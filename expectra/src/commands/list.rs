// expectra/src/commands/list.rs
//
// USE CASE: Show the expectation registry.

use comfy_table::Table;
use expectra_core::domain::expectation::ExpectationRegistry;

pub fn execute() -> anyhow::Result<()> {
    let registry = ExpectationRegistry::builtin();

    let mut table = Table::new();
    table.set_header(vec!["Expectation", "Metrics", "Success keys", "Tags"]);
    for kind in registry.kinds() {
        table.add_row(vec![
            kind.name().to_string(),
            kind.metric_dependencies().join(", "),
            kind.success_keys().join(", "),
            kind.library_metadata().tags.join(", "),
        ]);
    }

    println!("{table}");
    println!("{} expectation(s) registered.", registry.len());
    Ok(())
}
