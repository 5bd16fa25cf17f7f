//! The `examdesk init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("examdesk.toml").exists() {
        println!("examdesk.toml already exists, skipping.");
    } else {
        std::fs::write("examdesk.toml", SAMPLE_CONFIG)?;
        println!("Created examdesk.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point base_url at your unit service and set api_token");
    println!("  2. Run: examdesk tree");
    println!("  3. Run: examdesk coverage <exam-sheet-id>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examdesk configuration

base_url = "http://localhost:8080"
api_token = "${EXAMDESK_API_TOKEN}"
timeout_secs = 30
# default_grade = 1
"#;
