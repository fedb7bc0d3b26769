use crate::prelude::{eprintln, println, *};
use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
#[command(name = "ask")]
#[command(about = "Ask a question grounded in documentation files")]
pub struct App {
    /// The question to answer
    pub question: String,

    /// Documentation files to include as context
    #[clap(long = "docs-file")]
    pub docs_files: Vec<PathBuf>,

    /// Inline documentation context
    #[clap(long)]
    pub docs: Option<String>,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if app.question.trim().is_empty() {
        return Err(eyre!("Please provide a question"));
    }

    let docs = crate::generate::collect_context(app.docs, &app.docs_files).await?;
    let session = crate::build_session(&global)?;

    if global.verbose {
        eprintln!("Model: {}", session.settings().model);
        eprintln!(
            "Docs context: {} chars",
            docs.as_deref().map(str::len).unwrap_or(0)
        );
    }

    let answer = session.ask(&app.question, docs.as_deref()).await?;
    println!("{answer}");

    Ok(())
}
