//! SessionKit CLI - command-line client for a SessionKit server
//!
//! Signs in with cookie delivery, keeps the session between invocations and renews it
//! transparently when the access credential has expired.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::{default_config_path, CliConfig};
use sessionkit_client::{
    ClientError, GuardConfig, Registration, SessionClient, SessionStore, SignInNavigator,
};
use sessionkit_core::{chrono::Utc, init_logging, LoggingConfig, UpdateUserRequest, UserProfile};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "sessionkit")]
#[command(about = "Sign in to a SessionKit server and manage the session")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server URL, overriding the configuration
    #[arg(long)]
    server: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        email: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },

    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Show the signed-in user
    Whoami {
        /// Print the profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update the signed-in user's name
    Update {
        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },

    /// Renew the session now
    Refresh,

    /// Sign out
    Logout,

    /// Show the locally known session
    Status,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Write the default configuration file
        #[arg(long)]
        init: bool,

        /// Set a configuration value (key=value format)
        #[arg(long)]
        set: Option<String>,

        /// Get a configuration value
        #[arg(long)]
        get: Option<String>,
    },
}

/// Tells the terminal user to sign in again
struct TerminalNavigator;

impl SignInNavigator for TerminalNavigator {
    fn current_location(&self) -> Option<String> {
        None
    }

    fn redirect_to_sign_in(&self, _sign_in_path: &str) {
        eprintln!("Session expired. Run `sessionkit login` to sign in again.");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = if cli.verbose {
        LoggingConfig::with_level("debug")
    } else {
        LoggingConfig::with_level("warn")
    };
    init_logging(&logging).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }

    match cli.command {
        Commands::Config {
            show,
            init,
            set,
            get,
        } => handle_config(cli.config, config, show, init, set, get),
        command => {
            let client = connect(&config)?;
            run(&client, command).await
        }
    }
}

fn connect(config: &CliConfig) -> Result<SessionClient> {
    let store = match config.session_file() {
        Some(path) => SessionStore::open(path),
        None => SessionStore::in_memory(),
    };
    store.initialize();

    let mut guard = GuardConfig::default();
    if config.refresh_timeout_seconds > 0 {
        guard = guard.with_refresh_timeout(Duration::from_secs(config.refresh_timeout_seconds));
    }

    debug!("Connecting to {}", config.server_url);
    SessionClient::new(
        &config.client_config(),
        guard,
        Arc::new(store),
        Some(Arc::new(TerminalNavigator)),
    )
    .context("Failed to create client")
}

async fn run(client: &SessionClient, command: Commands) -> Result<()> {
    match command {
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            let password = password_or_prompt(password)?;
            client
                .register(Registration {
                    email: email.clone(),
                    password,
                    first_name,
                    last_name,
                })
                .await
                .context("Registration failed")?;
            println!("Registered and signed in as {}", email);
        }
        Commands::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let sdto = client
                .login(&email, &password)
                .await
                .context("Login failed")?;
            println!("Signed in as {}", email);
            if let Some(expires_at) = sdto.expires_at {
                println!("Access expires at {}", expires_at.to_rfc3339());
            }
        }
        Commands::Whoami { json } => {
            let user = client.current_user().await.map_err(sign_in_hint)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                print_user(&user);
            }
        }
        Commands::Update {
            first_name,
            last_name,
        } => {
            let user = client
                .update_user(&UpdateUserRequest {
                    first_name,
                    last_name,
                })
                .await
                .map_err(sign_in_hint)?;
            print_user(&user);
        }
        Commands::Refresh => {
            client.refresh().await.map_err(sign_in_hint)?;
            match client.store().expires_at() {
                Some(expires_at) => println!("Session renewed until {}", expires_at.to_rfc3339()),
                None => println!("Session renewed"),
            }
        }
        Commands::Logout => {
            client.logout().await.context("Logout failed")?;
            println!("Signed out");
        }
        Commands::Status => {
            let state = client.store().snapshot();
            match (&state.user, state.authenticated) {
                (Some(user), true) => println!("Signed in as {}", user.email),
                (None, true) => println!("Signed in"),
                _ => println!("Not signed in"),
            }
            if let Some(expires_at) = state.expires_at {
                let remaining = expires_at - Utc::now();
                if client.store().check_token_expiry() {
                    println!("Access credential expires at {} (renewal due)", expires_at.to_rfc3339());
                } else {
                    println!(
                        "Access credential expires in {} minutes",
                        remaining.num_minutes()
                    );
                }
            }
        }
        Commands::Config { .. } => bail!("configuration commands do not need a session"),
    }

    Ok(())
}

fn handle_config(
    path: Option<PathBuf>,
    config: CliConfig,
    show: bool,
    init: bool,
    set: Option<String>,
    get: Option<String>,
) -> Result<()> {
    let path = path
        .or_else(default_config_path)
        .context("No configuration directory available")?;

    if init {
        CliConfig::default().save_to_file(&path)?;
        println!("Configuration initialized at {}", path.display());
    }

    if show {
        println!("{}", toml::to_string_pretty(&config)?);
    }

    if let Some(key_value) = set {
        let (key, value) = key_value
            .split_once('=')
            .context("Invalid format. Use key=value, e.g. --set server_url=http://localhost:8080")?;
        let mut config = config;
        config.set(key.trim(), value.trim())?;
        config.save_to_file(&path)?;
        info!("Updated {}", path.display());
        println!("Set {} = {}", key.trim(), value.trim());
    } else if let Some(key) = get {
        println!("{} = {}", key, config.get(&key)?);
    }

    Ok(())
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    eprint!("Password: ");
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn sign_in_hint(error: ClientError) -> anyhow::Error {
    if error.requires_sign_in() {
        anyhow::Error::new(error).context("Not signed in")
    } else {
        anyhow::Error::new(error)
    }
}

fn print_user(user: &UserProfile) {
    let name = format!("{} {}", user.first_name, user.last_name);
    println!("{}", user.email);
    if !name.trim().is_empty() {
        println!("  Name:   {}", name.trim());
    }
    println!("  Id:     {}", user.id);
    println!("  Active: {}", user.is_active);
}
