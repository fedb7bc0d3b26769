use crate::prelude::{eprintln, *};
use crate::sinks::{OutputLog, TerminalSink};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, clap::Parser)]
#[command(name = "explain")]
#[command(about = "Explain a selected error message")]
pub struct App {
    /// The selected text. Read from stdin when omitted and no --file is given.
    pub selection: Option<String>,

    /// File holding the selection
    #[clap(long, conflicts_with = "selection")]
    pub file: Option<PathBuf>,

    /// 1-based inclusive line range within --file, e.g. "12:20" or "7"
    #[clap(long, requires = "file")]
    pub lines: Option<String>,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let selection = match (&app.selection, &app.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => read_selection(path, app.lines.as_deref()).await?,
        (None, None) => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read selection from stdin")?;
            buffer
        }
    };

    if global.verbose {
        eprintln!("Selection: {} lines", selection.lines().count());
    }

    let mut session = crate::build_session(&global)?;
    let mut sink = TerminalSink::default();
    let mut log = OutputLog::open_default()?;

    session.explain(&selection, &mut sink, &mut log).await
}

async fn read_selection(path: &Path, lines: Option<&str>) -> Result<String> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| eyre!("Failed to read file '{}': {}", path.display(), e))?;

    match lines {
        Some(range) => {
            let (start, end) = parse_line_range(range)?;
            Ok(select_lines(&content, start, end))
        }
        None => Ok(content),
    }
}

/// Parse "A:B" or "A" into a 1-based inclusive range.
pub fn parse_line_range(range: &str) -> Result<(usize, usize)> {
    let parse = |s: &str| -> Result<usize> {
        let n: usize = s
            .trim()
            .parse()
            .map_err(|_| eyre!("Invalid line number '{}' in range '{}'", s, range))?;
        if n == 0 {
            return Err(eyre!("Line numbers start at 1 (got range '{}')", range));
        }
        Ok(n)
    };

    let (start, end) = match range.split_once(':') {
        Some((start, end)) => (parse(start)?, parse(end)?),
        None => {
            let line = parse(range)?;
            (line, line)
        }
    };

    if end < start {
        return Err(eyre!("Line range '{}' ends before it starts", range));
    }

    Ok((start, end))
}

/// Lines `start..=end` (1-based) of `content`. Out of range lines are skipped.
pub fn select_lines(content: &str, start: usize, end: usize) -> String {
    content
        .lines()
        .skip(start - 1)
        .take(end - start + 1)
        .collect::<Vec<_>>()
        .join("\n")
}
