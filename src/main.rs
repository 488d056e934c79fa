//! nashlogin - log into nashanyanya.ru and save a session state
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;

use clap::Parser;
use nashlogin::core::error::NashError;
use nashlogin::{Config, Credentials, SessionState};

/// Log into nashanyanya.ru and save a session state for reuse
#[derive(Parser, Debug)]
#[command(name = "nashlogin")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Homepage URL
    #[arg(long)]
    base_url: Option<String>,

    /// Run headless; pass --headless=false to force a visible window even
    /// when the config file or NASHLOGIN_HEADLESS says otherwise
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    headless: Option<bool>,

    /// Path to save the storage state
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Default timeout in milliseconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Inspect an existing session file instead of logging in
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref base_url) = args.base_url {
        config.site.base_url = base_url.clone();
    }

    if let Some(headless) = args.headless {
        config.browser.headless = headless;
    }

    if let Some(ref storage) = args.storage {
        config.storage.path = storage.clone();
    }

    if let Some(timeout) = args.timeout {
        config.browser.timeout_ms = timeout;
    }

    // Inspect-only mode
    if args.check {
        return check_session(&config);
    }

    let credentials = match Credentials::from_env() {
        Ok(c) => c,
        Err(e) => fail(e),
    };

    match nashlogin::login::run(&config, &credentials).await {
        Ok(state) => {
            println!(
                "✅ Login successful. Session saved to: {}",
                config.storage.path.display()
            );
            print_summary(&config, &state);
            Ok(())
        }
        Err(e) => fail(e),
    }
}

fn check_session(config: &Config) -> anyhow::Result<()> {
    let state = match SessionState::load(&config.storage.path) {
        Ok(s) => s,
        Err(e) => fail(e),
    };

    println!("Session file: {}", config.storage.path.display());
    println!("─────────────────────────────");
    println!("Cookies:     {}", state.cookies.len());
    for origin in &state.origins {
        println!(
            "Origin:      {} ({} localStorage entries)",
            origin.origin,
            origin.local_storage.len()
        );
    }
    println!("Age:         {}h", state.age_secs() / 3600);
    if state.is_stale() {
        println!("⚠️  Session is over 7 days old and has likely expired.");
    }
    Ok(())
}

fn print_summary(config: &Config, state: &SessionState) {
    println!("\nLogin Summary");
    println!("─────────────────────────────");
    println!("Base URL:    {}", config.site.base_url);
    println!("Storage:     {}", config.storage.path.display());
    println!("Headless:    {}", config.browser.headless);
    println!("Cookies:     {}", state.cookies.len());
}

fn fail(e: NashError) -> ! {
    eprintln!("❌ {}", e);
    std::process::exit(e.exit_code());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_flag_overrides_both_ways() {
        let args = Args::try_parse_from(["nashlogin"]).unwrap();
        assert_eq!(args.headless, None);

        let args = Args::try_parse_from(["nashlogin", "--headless"]).unwrap();
        assert_eq!(args.headless, Some(true));

        let args = Args::try_parse_from(["nashlogin", "--headless=false"]).unwrap();
        assert_eq!(args.headless, Some(false));

        let args = Args::try_parse_from(["nashlogin", "--headless", "true"]).unwrap();
        assert_eq!(args.headless, Some(true));
    }

    #[test]
    fn test_flag_defaults() {
        let args = Args::try_parse_from(["nashlogin"]).unwrap();
        assert!(args.base_url.is_none());
        assert!(args.storage.is_none());
        assert!(args.timeout.is_none());
        assert!(!args.check);
    }
}
