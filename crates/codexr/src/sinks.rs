use crate::prelude::{eprintln, println, *};
use codexr_core::interpret::GenerationResult;
use codexr_core::mode::Mode;
use codexr_core::panel::Outbound;
use colored::Colorize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Where results and user-facing messages go.
pub trait ResultSink {
    fn show(&mut self, mode: Mode, result: &GenerationResult) -> Result<()>;

    fn fail(&mut self, message: &str) -> Result<()>;

    fn warn(&mut self, message: &str) -> Result<()>;

    fn notice(&mut self, message: &str) -> Result<()>;

    /// Hand a snippet to the host for insertion at the cursor.
    fn insert(&mut self, snippet: &str) -> Result<()>;
}

/// Append-only text log.
pub trait LogSink {
    fn append(&mut self, text: &str) -> Result<()>;
}

/// Renders results on the terminal.
#[derive(Debug, Default)]
pub struct TerminalSink {
    /// Print panel `result` messages instead of formatted output.
    pub json: bool,
}

impl TerminalSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl ResultSink for TerminalSink {
    fn show(&mut self, mode: Mode, result: &GenerationResult) -> Result<()> {
        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&Outbound::from_result(result))?
            );
            return Ok(());
        }

        match result {
            GenerationResult::Raw(text) => println!("{text}"),
            GenerationResult::Structured(map) => match mode {
                Mode::Plan => match result.plan() {
                    Some(plan) => print_plan(&plan),
                    None => print_json(map)?,
                },
                Mode::Code => match result.code() {
                    Some(code) => {
                        print_section("Code", &code.code);
                        print_section("Explanation", &code.explanation);
                    }
                    None => print_json(map)?,
                },
                Mode::Debug => match result.debug() {
                    Some(debug) => {
                        print_section("Cause", &debug.cause);
                        print_section("Fix", &debug.fix);
                        print_section("Fixed Code", &debug.fixed_code);
                    }
                    None => print_json(map)?,
                },
            },
        }

        Ok(())
    }

    fn fail(&mut self, message: &str) -> Result<()> {
        eprintln!("{} {}", "error:".red().bold(), message);
        Ok(())
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
        Ok(())
    }

    fn notice(&mut self, message: &str) -> Result<()> {
        eprintln!("{} {}", "CodeXR:".green().bold(), message);
        Ok(())
    }

    fn insert(&mut self, snippet: &str) -> Result<()> {
        print!("{snippet}");
        std::io::stdout().flush()?;
        Ok(())
    }
}

fn print_plan(plan: &codexr_core::interpret::PlanResult) {
    let mut table = new_table();
    table.set_titles(prettytable::row![
        "#".bold().cyan(),
        "Step".bold().cyan(),
        "Difficulty".bold().cyan(),
        "Minutes".bold().cyan()
    ]);

    for (i, (step, difficulty, minutes)) in plan.rows().into_iter().enumerate() {
        let difficulty = match difficulty.as_deref() {
            Some("easy") => "easy".green().to_string(),
            Some("medium") => "medium".yellow().to_string(),
            Some("hard") => "hard".red().to_string(),
            Some(other) => other.to_string(),
            None => "-".bright_black().to_string(),
        };
        let minutes = minutes
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());

        let index = (i + 1).to_string();

        table.add_row(prettytable::row![index, step, difficulty, minutes]);
    }

    table.printstd();

    if !plan.time.is_empty() {
        std::println!(
            "\n{}: {} minutes",
            "Total".bold().cyan(),
            plan.total_minutes()
        );
    }
}

fn print_section(title: &str, body: &str) {
    if body.is_empty() {
        return;
    }
    std::println!("{}:", title.bold().cyan());
    std::println!("{}\n", body);
}

fn print_json(map: &serde_json::Map<String, serde_json::Value>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(map)?);
    Ok(())
}

/// Output channel: every entry goes to stderr and is appended to a log
/// file, created on first use.
#[derive(Debug)]
pub struct OutputLog {
    path: Option<PathBuf>,
    file: Option<File>,
}

impl OutputLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path, file: None }
    }

    /// The log at `<cache dir>/codexr/codexr.log`.
    pub fn open_default() -> Result<Self> {
        let path = crate::config::cache_dir()?.join(crate::config::OUTPUT_LOG_FILE);
        Ok(Self::new(Some(path)))
    }

    fn file(&mut self) -> Result<Option<&mut File>> {
        if self.file.is_none() {
            if let Some(path) = &self.path {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open output log {}", path.display()))?;
                self.file = Some(file);
            }
        }
        Ok(self.file.as_mut())
    }
}

pub fn format_entry(text: &str) -> String {
    f!("\n=== CodeXR ===\n{text}\n")
}

impl LogSink for OutputLog {
    fn append(&mut self, text: &str) -> Result<()> {
        let entry = format_entry(text);
        eprintln!("{entry}");

        if let Some(file) = self.file()? {
            writeln!(file, "{entry}")?;
        }

        Ok(())
    }
}

/// Writes panel protocol messages as JSON lines.
pub struct PanelSink<W: Write> {
    writer: W,
}

impl<W: Write> PanelSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn send(&mut self, message: &Outbound) -> Result<()> {
        let line = serde_json::to_string(message)?;
        log::debug!("Sending: {line}");
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultSink for PanelSink<W> {
    fn show(&mut self, _mode: Mode, result: &GenerationResult) -> Result<()> {
        self.send(&Outbound::from_result(result))
    }

    fn fail(&mut self, message: &str) -> Result<()> {
        self.send(&Outbound::error(message))
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        self.send(&Outbound::Warning {
            message: message.to_string(),
        })
    }

    fn notice(&mut self, message: &str) -> Result<()> {
        log::info!("{message}");
        Ok(())
    }

    fn insert(&mut self, snippet: &str) -> Result<()> {
        self.send(&Outbound::Insert {
            text: snippet.to_string(),
        })
    }
}
