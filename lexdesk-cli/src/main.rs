//! LexDesk CLI - Command-line client for the LexDesk practice backend
//!
//! Logs in against the API, keeps the session on disk between invocations and
//! shows what the signed-in user can reach.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use lexdesk_client::{AuthFlow, HttpAuthService, LoginForm};
use lexdesk_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success, LexConfig,
    LoggingConfig, NavigationPolicy,
};
use lexdesk_session::auth::department_label;
use lexdesk_session::{
    is_active, AppRoute, MenuSection, NavigationFilter, RouteGuard, SessionContext, SessionStore,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "lexdesk")]
#[command(about = "Command-line client for the LexDesk legal practice backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Password; prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// End the session
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Re-fetch the profile from the server first
        #[arg(long)]
        refresh: bool,
    },

    /// Change the account password
    Passwd {
        /// Current password; prompted for when omitted
        #[arg(long)]
        current: Option<String>,

        /// New password; prompted for when omitted
        #[arg(long)]
        new: Option<String>,
    },

    /// Print the navigation menu visible to the signed-in user
    Menu {
        /// Visibility policy for items without an admin rule (allow | deny)
        #[arg(long)]
        policy: Option<NavigationPolicy>,

        /// Mark the entry matching this path as active
        #[arg(long)]
        path: Option<String>,
    },

    /// Show what the route guard decides for a path
    Route {
        /// Requested path, e.g. /cases
        path: String,
    },

    /// Configuration management
    Config {
        /// Write a default configuration file
        #[arg(long)]
        init: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    let config_path = cli.config;

    // Loaded per command so `config` keeps working when the file is broken
    let load = || -> anyhow::Result<LexConfig> {
        let config = LexConfig::load_or_default(config_path.as_deref())
            .context("Failed to load configuration")?;
        init_cli_logging(verbose, &config.logging)?;
        debug!("Starting LexDesk CLI v{}", env!("CARGO_PKG_VERSION"));
        Ok(config)
    };

    match cli.command {
        Commands::Login { email, password } => handle_login(&load()?, email, password).await,
        Commands::Logout => handle_logout(&load()?).await,
        Commands::Whoami { refresh } => handle_whoami(&load()?, refresh).await,
        Commands::Passwd { current, new } => handle_passwd(&load()?, current, new).await,
        Commands::Menu { policy, path } => handle_menu(&load()?, policy, path).await,
        Commands::Route { path } => handle_route(&load()?, &path).await,
        Commands::Config { init, show } => {
            init_cli_logging(verbose, &LoggingConfig::default())?;
            handle_config(config_path.clone(), init, show)
        }
    }
}

fn init_cli_logging(verbose: bool, configured: &LoggingConfig) -> anyhow::Result<()> {
    let logging_config = if verbose {
        LoggingConfig::verbose()
    } else {
        configured.clone()
    };
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

/// Session rehydrated from the configured storage, plus the flows over it
fn open_session(config: &LexConfig) -> anyhow::Result<(SessionContext, AuthFlow)> {
    let store = SessionStore::open(config).context("Failed to open session storage")?;
    let session = SessionContext::new(store);
    let service = HttpAuthService::from_config(config, session.clone())?;
    let flow = AuthFlow::new(Arc::new(service), session.clone());
    Ok((session, flow))
}

fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn handle_login(
    config: &LexConfig,
    email: String,
    password: Option<String>,
) -> anyhow::Result<()> {
    log_operation_start!("login", email = %email);

    let (session, flow) = open_session(config)?;
    let password = match password {
        Some(password) => password,
        None => prompt("Password")?,
    };

    let notification = flow.login(&LoginForm::new(email, password)).await;
    if !notification.is_success() {
        log_operation_error!("login", notification.message);
        bail!("{}", notification.message);
    }

    println!("✅ {}", notification.message);
    if let Some(name) = session.read().await.display_name() {
        println!("Signed in as {}", name);
    }
    log_operation_success!("login");
    Ok(())
}

async fn handle_logout(config: &LexConfig) -> anyhow::Result<()> {
    let (session, flow) = open_session(config)?;

    if !session.is_authenticated().await {
        flow.logout().await;
        println!("Not logged in");
        return Ok(());
    }

    let notification = flow.logout().await;
    println!("{}", notification);
    Ok(())
}

async fn handle_whoami(config: &LexConfig, refresh: bool) -> anyhow::Result<()> {
    let (session, flow) = open_session(config)?;

    if !session.is_authenticated().await {
        println!("Not logged in");
        return Ok(());
    }

    if refresh {
        match flow.refresh_profile().await {
            Ok(_) => info!("Profile refreshed"),
            Err(e) if e.is_unauthorized() => {
                println!("⚠️  The server rejected the stored session: {}", e.user_message());
                println!("Run 'lexdesk login' to sign in again.");
                return Ok(());
            }
            Err(e) => {
                e.log();
                println!("⚠️  Could not refresh profile: {}", e.user_message());
            }
        }
    }

    let store = session.read().await;
    let Some(user) = store.user() else {
        println!("Not logged in");
        return Ok(());
    };

    println!("{} ({})", user.full_name(), user.initials());
    println!("  Email:      {}", user.email);
    println!("  Role:       {} [{:?}]", user.role.label(), user.role.tier());
    if !user.department.is_empty() {
        println!("  Department: {}", department_label(&user.department));
    }
    println!("  Title:      {}", user.subtitle());

    let granted = user.permissions.granted();
    if user.role.as_str() == config.navigation.owner_role {
        println!("  Access:     full (owner role)");
    } else if granted.is_empty() {
        println!("  Access:     no capabilities granted");
    } else {
        let names: Vec<String> = granted.iter().map(ToString::to_string).collect();
        println!("  Access:     {}", names.join(", "));
    }

    let modules: Vec<&str> = user.permissions.modules().collect();
    if !modules.is_empty() {
        println!("  Modules:    {}", modules.join(", "));
    }

    Ok(())
}

async fn handle_passwd(
    config: &LexConfig,
    current: Option<String>,
    new: Option<String>,
) -> anyhow::Result<()> {
    let (session, flow) = open_session(config)?;

    if !session.is_authenticated().await {
        bail!("Not logged in. Run 'lexdesk login' first.");
    }

    let current = match current {
        Some(current) => current,
        None => prompt("Current password")?,
    };
    let new = match new {
        Some(new) => new,
        None => prompt("New password")?,
    };

    log_operation_start!("change_password");
    match flow.change_password(&current, &new).await {
        Ok(()) => {
            log_operation_success!("change_password");
            println!("✅ Password changed");
            Ok(())
        }
        Err(e) => {
            log_operation_error!("change_password", e);
            bail!("{}", e.user_message())
        }
    }
}

fn print_menu(menu: &[MenuSection], current_path: Option<&str>) {
    let marker = |active: bool| if active { "▸" } else { " " };

    for section in menu {
        println!("{}", section.title);
        for item in &section.items {
            let active = current_path.is_some_and(|path| is_active(item, path));
            let route = item.route.unwrap_or("");
            println!("  {} {:<20} {}", marker(active), item.label, route);

            for child in &item.children {
                let active = current_path.is_some_and(|path| is_active(child, path));
                let route = child.route.unwrap_or("");
                println!("    {} {:<18} {}", marker(active), child.label, route);
            }
        }
    }
}

async fn handle_menu(
    config: &LexConfig,
    policy: Option<NavigationPolicy>,
    path: Option<String>,
) -> anyhow::Result<()> {
    let store = SessionStore::open(config)?;
    let guard = RouteGuard::from_config(&config.navigation);

    if !store.is_authenticated() {
        println!(
            "Not logged in; the guard sends every protected view to {}",
            guard.login_path()
        );
        return Ok(());
    }

    let mut filter = NavigationFilter::from_config(&config.navigation);
    if let Some(policy) = policy {
        filter = filter.with_policy(policy);
    }

    let access = store.access_context(filter.owner_role().clone());
    debug!("Filtering menu for {} ({})", access.summary(), filter.policy());

    let visible = filter.visible(&access);
    print_menu(&visible, path.as_deref());
    Ok(())
}

async fn handle_route(config: &LexConfig, path: &str) -> anyhow::Result<()> {
    let store = SessionStore::open(config)?;
    let guard = RouteGuard::from_config(&config.navigation);
    let authenticated = store.is_authenticated();

    let decision = guard.check(authenticated, path);
    let target = guard.target(authenticated, path);

    println!("{} -> {} ({})", path, target, decision);
    match AppRoute::resolve(target) {
        Some(route) => println!("View: {}", route.title()),
        None if guard.is_login_path(target) => println!("View: Login"),
        None => println!("View: not found"),
    }

    Ok(())
}

fn handle_config(path: Option<PathBuf>, init: bool, show: bool) -> anyhow::Result<()> {
    if !init && !show {
        bail!("Nothing to do: pass --init or --show");
    }

    if init {
        let path = path
            .clone()
            .or_else(LexConfig::default_path)
            .context("Cannot determine a configuration path; pass --config")?;

        if path.exists() {
            bail!("Configuration already exists at {}", path.display());
        }

        LexConfig::default().save_to_file(&path)?;
        println!("✅ Configuration initialized at: {}", path.display());
    }

    if show {
        let config = LexConfig::load_or_default(path.as_deref()).with_context(|| match &path {
            Some(path) => format!("Configuration at {} is invalid", path.display()),
            None => "Configuration is invalid".to_string(),
        })?;
        println!("{}", toml::to_string_pretty(&config)?);
    }

    Ok(())
}
