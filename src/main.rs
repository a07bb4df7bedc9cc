//! Pommel - Page Object Model browser test framework
//!
//! Main entry point for the CLI application.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pommel::{Browser, Config, DriverManager};

/// Pommel - browser automation with HTML snapshot history
#[derive(Parser, Debug)]
#[command(name = "pommel")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Browser to drive (chrome, firefox)
    #[arg(long, short = 'b')]
    browser: Option<String>,

    /// Run without a visible browser window
    #[arg(long)]
    headless: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Navigate to a URL and capture its HTML snapshot
    Capture {
        /// URL to open
        #[arg(long, short = 'u')]
        url: String,

        /// Subject name for the snapshot files
        #[arg(long, short = 's')]
        subject: String,

        /// History copies to keep (defaults to config)
        #[arg(long, short = 'k')]
        keep: Option<usize>,
    },

    /// Verify the WebDriver setup by starting a session
    Check,

    /// Print the effective configuration
    Config {
        /// Write the default config file and print its path
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pommel=info")),
        )
        .init();

    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(ref browser) = args.browser {
        config.browser.name = browser.clone();
    }

    if args.headless {
        config.browser.headless = true;
    }

    match args.command {
        Command::Capture { url, subject, keep } => {
            if let Some(keep) = keep {
                config.snapshots.keep_history = keep;
            }
            let driver = DriverManager::launch(&config).await?;
            let browser = Browser::new(driver, config);

            browser.open(&url, &subject).await?;

            let store = browser.snapshots();
            match store.read_live(&subject)? {
                Some(_) => {
                    println!(
                        "Snapshot saved: {}",
                        store.root().join(format!("{}.html", subject)).display()
                    );
                    for entry in store.history(&subject)? {
                        println!("  history: {}", entry.display());
                    }
                }
                None => println!("Snapshot could not be saved; see log output"),
            }

            browser.quit().await;
        }

        Command::Check => {
            let driver = DriverManager::launch(&config).await?;
            println!(
                "WebDriver OK: {} session {} at {}",
                config.browser.name,
                driver.session_id(),
                driver.server_url()
            );
            driver.quit().await;
        }

        Command::Config { init } => {
            if init {
                let path = config.save_and_get_path()?;
                println!("Config written to {}", path.display());
            } else {
                print!("{}", Config::default_config_toml());
            }
        }
    }

    Ok(())
}
