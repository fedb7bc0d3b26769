use crate::prelude::{eprintln, *};
use crate::sinks::{ResultSink, TerminalSink};
use codexr_core::mode::Mode;
use codexr_core::prompt::GenerationRequest;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
#[command(name = "generate")]
#[command(about = "Run one plan/code/debug request")]
pub struct App {
    /// Request mode: plan, code, or debug
    pub mode: Mode,

    /// Task, code request, or error message ("-" reads stdin)
    pub text: String,

    /// Additional context (docs, constraints, related code)
    #[clap(long)]
    pub context: Option<String>,

    /// Read additional context from a file (appended after --context)
    #[clap(long)]
    pub context_file: Vec<PathBuf>,

    /// Output the panel result message as JSON
    #[arg(long)]
    pub json: bool,

    /// Print only the resulting snippet, ready to insert
    #[arg(long, conflicts_with = "json")]
    pub snippet: bool,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let text = if app.text == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read request text from stdin")?;
        buffer
    } else {
        app.text
    };

    let context = collect_context(app.context, &app.context_file).await?;
    let mut session = crate::build_session(&global)?;

    if global.verbose {
        eprintln!("Model: {}", session.settings().model);
        eprintln!("Mode: {}", app.mode);
    }

    let result = session
        .generate(GenerationRequest::new(app.mode, text, context))
        .await?;

    let mut sink = TerminalSink::new(app.json);

    if app.snippet {
        if !session.insert_last(&mut sink)? {
            return Err(eyre!("The {} result carries no code to insert", app.mode));
        }
        return Ok(());
    }

    sink.show(app.mode, &result)
}

/// Join the inline context and the content of every context file.
pub async fn collect_context(inline: Option<String>, files: &[PathBuf]) -> Result<Option<String>> {
    let mut parts: Vec<String> = inline.into_iter().filter(|c| !c.is_empty()).collect();

    for path in files {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read context file '{}': {}", path.display(), e))?;
        parts.push(f!("// {}\n{}", path.display(), content));
    }

    Ok((!parts.is_empty()).then(|| parts.join("\n\n")))
}
