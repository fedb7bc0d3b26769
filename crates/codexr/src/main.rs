use crate::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod ask;
mod client;
mod config;
mod credentials;
mod error;
mod explain;
mod generate;
mod key;
mod panel;
mod prelude;
mod session;
mod sinks;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Plan tasks, generate snippets, and debug errors with Gemini"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Gemini model identifier
    #[clap(long, env = "CODEXR_MODEL", global = true)]
    model: Option<String>,

    /// Gemini API base URL
    #[clap(long, env = "CODEXR_API_BASE", global = true)]
    api_base: Option<String>,

    /// Request timeout in seconds (0 disables it)
    #[clap(long, env = "CODEXR_TIMEOUT", global = true)]
    timeout: Option<u64>,

    /// Path to the config file (defaults to <config dir>/codexr/config.toml)
    #[clap(long, env = "CODEXR_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "CODEXR_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

impl Global {
    /// Environment variables and flags as the top settings layer.
    pub fn settings_layer(&self) -> codexr_core::settings::SettingsLayer {
        codexr_core::settings::SettingsLayer {
            model: self.model.clone(),
            api_base: self.api_base.clone(),
            timeout_secs: self.timeout,
        }
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Run one plan/code/debug request
    Generate(crate::generate::App),

    /// Explain a selected error message and write the result to the output log
    Explain(crate::explain::App),

    /// Ask a question grounded in documentation files
    Ask(crate::ask::App),

    /// Manage the stored Gemini API key
    Key(crate::key::App),

    /// Serve the editor panel protocol on stdio
    Panel(crate::panel::App),
}

/// Session wired to the real credential store and Gemini client.
pub fn build_session(global: &Global) -> Result<session::Session> {
    let settings = config::load_settings(global)?;
    let credentials = credentials::default_store()?;
    let client = client::GeminiClient::new(&settings)?;

    Ok(session::Session::new(
        settings,
        Arc::new(credentials),
        Arc::new(client),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Generate(sub_app) => crate::generate::run(sub_app, app.global).await,
        SubCommands::Explain(sub_app) => crate::explain::run(sub_app, app.global).await,
        SubCommands::Ask(sub_app) => crate::ask::run(sub_app, app.global).await,
        SubCommands::Key(sub_app) => crate::key::run(sub_app, app.global).await,
        SubCommands::Panel(sub_app) => crate::panel::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
