//! Stockroom CLI - a command-line front end for the stockroom service.
//!
//! Each invocation loads the stored session, runs one command through the
//! route table and the API client, and exits.

use std::io::{self, Write};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stockroom_core::router::routes;
use stockroom_core::utils::{format_age, truncate_string};
use stockroom_core::{App, AppError, Config, FileStorage, Session, ROUTES};

// ============================================================================
// Constants
// ============================================================================

const USAGE: &str = "\
Usage: stockroom <command> [args]

Commands:
  routes                       List client routes
  login [username]             Log in (password is prompted)
  register <username> <email>  Create an account
  logout                       Forget the stored session
  whoami                       Show the logged-in user
  open <path>                  Navigate to a view and print its data
  get <api-path>               Send an authenticated GET request";

const USERNAME_ENV: &str = "STOCKROOM_USERNAME";
const PASSWORD_ENV: &str = "STOCKROOM_PASSWORD";

/// Longest JSON value shown in a whoami field before it is cut off
const MAX_FIELD_WIDTH: usize = 60;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        return Ok(());
    };

    match command.as_str() {
        "routes" => {
            print_routes();
            return Ok(());
        }
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            return Ok(());
        }
        _ => {}
    }

    let mut app = build_app()?;

    let result = match command.as_str() {
        "login" => login(&mut app, args.get(1).map(String::as_str)).await,
        "register" => register(&mut app, &args[1..]).await,
        "logout" => logout(&mut app),
        "whoami" => whoami(&app),
        "open" => open(&mut app, args.get(1).map(String::as_str)).await,
        "get" => get(&mut app, args.get(1).map(String::as_str)).await,
        other => Err(anyhow::anyhow!("Unknown command: {}\n\n{}", other, USAGE)),
    };

    if let Err(ref e) = result {
        let expired = e
            .downcast_ref::<AppError>()
            .map(AppError::is_session_expired)
            .unwrap_or(false);
        if expired {
            eprintln!("Your session has expired. Run `stockroom login` to sign in again.");
        }
    }

    result
}

fn build_app() -> Result<App> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            let mut config = Config::default();
            config.apply_env();
            config
        }
    };

    let storage = FileStorage::open_default().context("Failed to open session storage")?;
    info!(path = %storage.path().display(), "Session storage opened");

    Ok(App::new(config, Session::new(storage))?)
}

fn print_routes() {
    println!("{:<12} {:<12} {}", "PATH", "NAME", "ACCESS");
    for route in ROUTES {
        let access = if route.requires_auth { "login required" } else { "public" };
        println!("{:<12} {:<12} {}", route.path, route.name, access);
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    rpassword::prompt_password("Password: ").context("Failed to read password")
}

async fn login(app: &mut App, username: Option<&str>) -> Result<()> {
    if app.is_authenticated() {
        let name = app
            .current_user()
            .map(|u| u.display_name())
            .unwrap_or_else(|| "the stored user".to_string());
        println!("Already logged in as {}. Run `stockroom logout` first.", name);
        return Ok(());
    }

    let username = match username {
        Some(name) => name.to_string(),
        None => match std::env::var(USERNAME_ENV).ok().or_else(|| app.config().last_username.clone()) {
            Some(last) => {
                let input = prompt(&format!("Username [{}]", last))?;
                if input.is_empty() { last } else { input }
            }
            None => prompt("Username")?,
        },
    };
    let password = prompt_password()?;

    app.login(&username, &password).await?;

    let name = app
        .current_user()
        .map(|u| u.display_name())
        .unwrap_or_else(|| username.clone());
    println!("Logged in as {}", name);
    Ok(())
}

async fn register(app: &mut App, args: &[String]) -> Result<()> {
    let [username, email] = args else {
        anyhow::bail!("Usage: stockroom register <username> <email>");
    };
    let password = prompt_password()?;

    if app.register(username, email, &password).await? {
        println!("Account created. Logged in as {}", username);
    } else {
        println!("Account created. Run `stockroom login {}` to sign in.", username);
    }
    Ok(())
}

fn logout(app: &mut App) -> Result<()> {
    app.logout()?;
    println!("Logged out");
    Ok(())
}

fn whoami(app: &App) -> Result<()> {
    if !app.is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }

    match app.current_user() {
        Some(user) => {
            println!("{}", user.display_name());
            if let Some(fields) = user.as_value().as_object() {
                for (key, value) in fields {
                    let shown = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    println!("  {:<12} {}", key, truncate_string(&shown, MAX_FIELD_WIDTH));
                }
            }
        }
        None => println!("Logged in (no cached user)"),
    }

    if let Some(started) = app.session().started_at() {
        println!("Session started {}", format_age(started, chrono::Utc::now()));
    }
    Ok(())
}

async fn open(app: &mut App, path: Option<&str>) -> Result<()> {
    let path = path.ok_or_else(|| anyhow::anyhow!("Usage: stockroom open <path>"))?;

    let page = app.open(path).await?;
    if page.route.path != routes::normalize(path) {
        eprintln!("Redirected to {}", page.route.path);
    }
    eprintln!("{} ({})", page.route.name, page.route.path);

    if let Some(data) = page.data {
        println!("{}", serde_json::to_string_pretty(&data)?);
    }
    Ok(())
}

async fn get(app: &mut App, path: Option<&str>) -> Result<()> {
    let path = path.ok_or_else(|| anyhow::anyhow!("Usage: stockroom get <api-path>"))?;

    let data: Value = app.fetch(path).await?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}
