use crate::credentials::CredentialStore;
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use std::io::{BufRead, Write};

#[derive(Debug, clap::Parser)]
#[command(name = "key")]
#[command(about = "Manage the stored Gemini API key")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Store the Gemini API key
    #[clap(name = "set")]
    Set(SetOptions),

    /// Remove the stored key
    #[clap(name = "clear")]
    Clear,

    /// Report whether a key is available (never prints it)
    #[clap(name = "status")]
    Status,
}

#[derive(Debug, clap::Args)]
pub struct SetOptions {
    /// The key. Prompted for on stdin when omitted.
    #[arg(long)]
    key: Option<String>,
}

pub async fn run(app: App, _global: crate::Global) -> Result<()> {
    let store = crate::credentials::default_store()?;

    match app.command {
        Commands::Set(options) => set(&store, options),
        Commands::Clear => clear(&store),
        Commands::Status => status(&store),
    }
}

fn set(store: &dyn CredentialStore, options: SetOptions) -> Result<()> {
    let key = match options.key {
        Some(key) => key,
        None => {
            eprint!("Enter your Gemini API Key: ");
            std::io::stderr().flush()?;
            read_key(std::io::stdin().lock())?
        }
    };

    if key.trim().is_empty() {
        eprintln!("{} No key entered; nothing saved.", "warning:".yellow().bold());
        return Ok(());
    }

    store.set(&key)?;
    println!("{} API key saved.", "CodeXR:".green().bold());

    Ok(())
}

fn clear(store: &dyn CredentialStore) -> Result<()> {
    if store.clear()? {
        println!("{} API key removed.", "CodeXR:".green().bold());
    } else {
        println!("No stored API key.");
    }
    Ok(())
}

fn status(store: &dyn CredentialStore) -> Result<()> {
    match store.get()? {
        Some(_) => println!("API key available ({})", store.describe()),
        None => println!("{}", Error::CredentialMissing.to_string().yellow()),
    }
    Ok(())
}

/// First line of `reader`, trimmed.
fn read_key<R: BufRead>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("Failed to read API key")?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::memory::MemoryCredentialStore;

    #[test]
    fn test_read_key_takes_first_line() {
        let input = b"  AIza-key  \nignored\n";
        assert_eq!(read_key(&input[..]).unwrap(), "AIza-key");
        assert_eq!(read_key(&b""[..]).unwrap(), "");
    }

    #[test]
    fn test_set_and_clear() {
        let store = MemoryCredentialStore::default();

        set(&store, SetOptions { key: Some(" AIza-key ".to_string()) }).unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("AIza-key"));

        clear(&store).unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_blank_key_is_not_saved() {
        let store = MemoryCredentialStore::with_key("existing");

        set(&store, SetOptions { key: Some("   ".to_string()) }).unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("existing"));
    }
}
