// expectra/src/commands/diagnose.rs
//
// USE CASE: Self-test every registered expectation against its built-in examples.

use expectra_core::application::{DiagnosticChecklist, run_examples};
use expectra_core::domain::expectation::ExpectationRegistry;
use expectra_core::domain::project::Engine;
use expectra_core::infrastructure::adapters::connect;
use expectra_core::infrastructure::compiler::JinjaRenderer;

pub async fn execute(engine: Engine) -> anyhow::Result<()> {
    let renderer = JinjaRenderer::new();
    let mut all_passed = true;

    for kind in ExpectationRegistry::builtin().kinds() {
        // Fresh engine per expectation so example tables never collide
        let connector = connect(engine, ":memory:")?;
        let outcomes = run_examples(kind, connector.as_ref(), &renderer).await?;

        for outcome in &outcomes {
            let mark = if outcome.passed { "PASS" } else { "FAIL" };
            println!("   [{}] {} ({})", mark, outcome.title, engine);
            if let Some(error) = &outcome.error {
                println!("          {}", error);
            }
        }

        let checklist = DiagnosticChecklist::build(kind, &outcomes);
        println!("{}", checklist);
        all_passed &= checklist.passed();
    }

    if !all_passed {
        std::process::exit(1);
    }
    Ok(())
}
