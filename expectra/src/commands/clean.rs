// expectra/src/commands/clean.rs
//
// USE CASE: Clean build artifacts.

use std::path::PathBuf;

use expectra_core::application::clean_project;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    match clean_project(&project_dir) {
        Ok(true) => println!("Artifacts removed."),
        Ok(false) => println!("Nothing to clean."),
        Err(e) => {
            eprintln!("Clean failed: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}
