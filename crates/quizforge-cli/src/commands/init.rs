//! The `quizforge init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizforge.toml").exists() {
        println!("quizforge.toml already exists, skipping.");
    } else {
        std::fs::write("quizforge.toml", SAMPLE_CONFIG)?;
        println!("Created quizforge.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizforge.toml with your Gemini API key (or export QUIZFORGE_GEMINI_KEY)");
    println!("  2. Run: quizforge start --topics \"dsa, javascript\"");
    println!("  3. Run: quizforge history");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizforge configuration

# Questions per quiz when --count is not given.
default_question_count = 25

# Where history, topic coverage, and preferences are stored.
# data_dir = "/home/you/.local/share/quizforge"

[gemini]
api_key = "${GEMINI_API_KEY}"
# model = "gemini-2.0-flash"
# base_url = "https://generativelanguage.googleapis.com"
"#;
