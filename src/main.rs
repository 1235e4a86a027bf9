// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, filtered by -v or RUST_LOG)
// 3. Work out the login: flags, stored credentials, or an interactive prompt
// 4. Wire ctrl-c to the crawl's interrupt flag
// 5. Run the crawl and print a summary
// 6. Exit with proper code (0 = completed or interrupted-and-saved, 1 = error)
// =============================================================================

mod cli;
mod crawl;
mod error;
mod fetch;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use crawl::{CrawlReport, CrawlState, Crawler, Interrupt};
use error::CredentialError;
use fetch::HttpFetcher;
use store::CredentialStore;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<()> {
    // Validate everything before asking for a password
    let config = cli.crawl_config()?;

    let store = CredentialStore::new(&cli.output_dir);
    let credentials = resolve_credentials(&cli, &store, &mut TerminalPrompt)?;
    let fetcher = HttpFetcher::new(cli.http_options(credentials)?)?;

    let interrupt = Interrupt::new();
    listen_for_ctrl_c(interrupt.clone());

    println!("🔍 Crawling: {}", cli.url);
    println!(
        "📊 Max depth: {}, max pages: {}",
        config.budget.max_depth(),
        config.budget.max_pages()
    );

    let mut crawler = Crawler::new(&cli.url, &cli.output_dir, config, fetcher)?
        .with_interrupt(interrupt);
    let outcome = crawler.run().await;
    let report =
        outcome.with_context(|| format!("crawl {:?} before fetching anything", crawler.state()))?;

    print_summary(&report);
    Ok(())
}

// RUST_LOG wins; otherwise -v picks how chatty our own crate is
fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn,doc_snapshot=info",
        1 => "warn,doc_snapshot=debug",
        _ => "warn,doc_snapshot=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// First ctrl-c: finish the current page, checkpoint, stop.
// Second ctrl-c: give up immediately.
fn listen_for_ctrl_c(interrupt: Interrupt) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("cannot listen for ctrl-c; interrupting will not save progress");
            return;
        }
        warn!("interrupt received, saving progress after the current page");
        interrupt.trigger();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Second interrupt, exiting without a final checkpoint");
            std::process::exit(130);
        }
    });
}

// Where interactive credentials come from. The terminal in production,
// a scripted answer in tests.
trait CredentialPrompt {
    /// Asks for a username and password; `None` means anonymous access.
    fn credentials(&mut self) -> Result<Option<(String, String)>, CredentialError>;
    fn password(&mut self) -> Result<String, CredentialError>;
}

struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn credentials(&mut self) -> Result<Option<(String, String)>, CredentialError> {
        print!("Username (leave empty for anonymous access): ");
        io::stdout()
            .flush()
            .map_err(|e| CredentialError::Prompt(e.to_string()))?;

        let mut username = String::new();
        io::stdin()
            .lock()
            .read_line(&mut username)
            .map_err(|e| CredentialError::Prompt(e.to_string()))?;

        let username = username.trim();
        if username.is_empty() {
            return Ok(None);
        }
        Ok(Some((username.to_string(), self.password()?)))
    }

    fn password(&mut self) -> Result<String, CredentialError> {
        rpassword::prompt_password("Password: ").map_err(|e| CredentialError::Prompt(e.to_string()))
    }
}

// Order of precedence:
//   1. --username and --password
//   2. credentials stored by an earlier --save-credentials run
//   3. interactive prompt (unless --no-prompt)
// An unusable stored record (bad key, tampered file) falls through to 3.
// An empty username at the prompt means an anonymous crawl.
fn resolve_credentials(
    cli: &Cli,
    store: &CredentialStore,
    prompt: &mut impl CredentialPrompt,
) -> Result<Option<(String, String)>> {
    let credentials = match (&cli.username, &cli.password) {
        (Some(username), Some(password)) => Some((username.clone(), password.clone())),
        (Some(username), None) if cli.no_prompt => Some((username.clone(), String::new())),
        (Some(username), None) => Some((username.clone(), prompt.password()?)),
        (None, password) => {
            if password.is_some() {
                warn!("--password given without --username, ignoring it");
            }
            if let Some((username, password)) = store.load_credentials() {
                println!("🔑 Using stored credentials for {}", username);
                return Ok(Some((username, password)));
            }
            if cli.no_prompt {
                None
            } else {
                prompt.credentials()?
            }
        }
    };

    if cli.save_credentials {
        match &credentials {
            Some((username, password)) => match store.save_credentials(username, password) {
                Ok(()) => println!("🔑 Credentials saved (encrypted) in {}", cli.output_dir.display()),
                Err(e) => warn!("could not save credentials: {}", e),
            },
            None => warn!("--save-credentials given but there are no credentials to save"),
        }
    }

    Ok(credentials)
}

// Prints a human-readable summary of the run
fn print_summary(report: &CrawlReport) {
    println!();
    println!("📊 Summary:");
    println!("   {}", format_state(report.state));
    println!("   ✅ Fetched: {}", report.pages_fetched);
    println!("   ❌ Failed: {}", report.pages_failed);
    println!("   📄 Files written: {}", report.pages_written);
    println!("   📋 Visited (all runs): {}", report.visited);
    println!("   ⏳ Still queued: {}", report.pending);

    if report.state == CrawlState::Interrupted {
        println!();
        println!("💾 Progress saved. Run the same command again to continue.");
    }
}

fn format_state(state: CrawlState) -> &'static str {
    match state {
        CrawlState::Idle => "💤 Not started",
        CrawlState::Running => "🏃 Running",
        CrawlState::Completed => "🏁 Completed",
        CrawlState::Interrupted => "⏸️  Interrupted",
        CrawlState::Aborted => "⚠️  Aborted",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    // Answers prompts from a script and counts how often it was asked
    #[derive(Default)]
    struct ScriptedPrompt {
        answer: Option<(String, String)>,
        credential_calls: usize,
        password_calls: usize,
    }

    impl ScriptedPrompt {
        fn answering(username: &str, password: &str) -> Self {
            Self {
                answer: Some((username.to_string(), password.to_string())),
                ..Self::default()
            }
        }
    }

    impl CredentialPrompt for ScriptedPrompt {
        fn credentials(&mut self) -> Result<Option<(String, String)>, CredentialError> {
            self.credential_calls += 1;
            Ok(self.answer.clone())
        }

        fn password(&mut self) -> Result<String, CredentialError> {
            self.password_calls += 1;
            Ok(self.answer.clone().map(|(_, p)| p).unwrap_or_default())
        }
    }

    fn cli(dir: &std::path::Path, extra: &[&str]) -> Cli {
        let mut args = vec![
            "doc-snapshot",
            "https://wiki.example.com/display/Proj",
            "--output-dir",
            dir.to_str().unwrap(),
        ];
        args.extend_from_slice(extra);
        Cli::parse_from(args)
    }

    fn pair(username: &str, password: &str) -> Option<(String, String)> {
        Some((username.to_string(), password.to_string()))
    }

    #[test]
    fn test_flags_win_over_stored_credentials() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save_credentials("stored", "old").unwrap();
        let cli = cli(dir.path(), &["--username", "flag", "--password", "new"]);
        let mut prompt = ScriptedPrompt::default();

        let credentials = resolve_credentials(&cli, &store, &mut prompt).unwrap();

        assert_eq!(credentials, pair("flag", "new"));
        assert_eq!(prompt.credential_calls + prompt.password_calls, 0);
    }

    #[test]
    fn test_username_flag_prompts_for_password_only() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        let cli = cli(dir.path(), &["--username", "flag"]);
        let mut prompt = ScriptedPrompt::answering("ignored", "typed");

        let credentials = resolve_credentials(&cli, &store, &mut prompt).unwrap();

        assert_eq!(credentials, pair("flag", "typed"));
        assert_eq!(prompt.password_calls, 1);
        assert_eq!(prompt.credential_calls, 0);
    }

    #[test]
    fn test_stored_credentials_skip_the_prompt() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save_credentials("alice", "s3cret").unwrap();
        let cli = cli(dir.path(), &[]);
        let mut prompt = ScriptedPrompt::answering("bob", "other");

        let credentials = resolve_credentials(&cli, &store, &mut prompt).unwrap();

        assert_eq!(credentials, pair("alice", "s3cret"));
        assert_eq!(prompt.credential_calls, 0);
    }

    #[test]
    fn test_unusable_stored_record_falls_back_to_prompt() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save_credentials("alice", "s3cret").unwrap();
        fs::write(dir.path().join(".key"), [7u8; 32]).unwrap();
        let cli = cli(dir.path(), &[]);
        let mut prompt = ScriptedPrompt::answering("bob", "typed");

        let credentials = resolve_credentials(&cli, &store, &mut prompt).unwrap();

        assert_eq!(credentials, pair("bob", "typed"));
        assert_eq!(prompt.credential_calls, 1);
    }

    #[test]
    fn test_no_prompt_means_anonymous() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        let cli = cli(dir.path(), &["--no-prompt"]);
        let mut prompt = ScriptedPrompt::answering("bob", "typed");

        let credentials = resolve_credentials(&cli, &store, &mut prompt).unwrap();

        assert_eq!(credentials, None);
        assert_eq!(prompt.credential_calls, 0);
    }

    #[test]
    fn test_empty_prompt_answer_is_anonymous() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        let cli = cli(dir.path(), &[]);
        let mut prompt = ScriptedPrompt::default();

        let credentials = resolve_credentials(&cli, &store, &mut prompt).unwrap();

        assert_eq!(credentials, None);
        assert_eq!(prompt.credential_calls, 1);
    }

    #[test]
    fn test_save_flag_stores_prompted_credentials() {
        let dir = tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        let cli = cli(dir.path(), &["--save-credentials"]);
        let mut prompt = ScriptedPrompt::answering("carol", "pw");

        resolve_credentials(&cli, &store, &mut prompt).unwrap();

        assert_eq!(store.load_credentials(), pair("carol", "pw"));
    }
}
