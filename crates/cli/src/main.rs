//! Food delivery CLI - drives the browser client against a running backend.
//!
//! # Usage
//!
//! ```bash
//! # Check the backend
//! fd-cli status
//!
//! # Log in (the session is kept in FOOD_STORAGE_PATH)
//! fd-cli login -u alice -p secret
//!
//! # Browse, fill the cart and order
//! fd-cli menu --category Pizza --search pepper
//! fd-cli add 7
//! fd-cli cart
//! fd-cli checkout --address "12 Baker Street" --payment CASH
//! fd-cli orders
//!
//! # Render any page as HTML
//! fd-cli open /profile.html
//! ```
//!
//! # Commands
//!
//! - `open` - Load a page and print its HTML
//! - `status` - Backend health check
//! - `login` / `register` / `logout` - Account flows
//! - `menu` / `add` - Browse the menu and add items to the cart
//! - `cart` / `checkout` / `orders` - Cart, order placement, order history

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use food_delivery_client::ClientConfig;
use food_delivery_core::MenuItemId;

mod commands;

use commands::CommandError;

#[derive(Parser)]
#[command(name = "fd-cli")]
#[command(author, version, about = "Food delivery client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a page and print the rendered HTML
    Open {
        /// Page path, e.g. `/menu.html`
        path: String,

        /// Run pending timers (redirects, notification fade-out) before printing
        #[arg(long)]
        settle: bool,
    },
    /// Check whether the backend is reachable
    Status,
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short = 'n', long)]
        full_name: String,

        #[arg(long, default_value = "")]
        phone: String,
    },
    /// Forget the stored session
    Logout,
    /// List menu items
    Menu {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive search over name, description and category
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add one unit of a menu item to the cart
    Add {
        /// Menu item id
        item_id: MenuItemId,
    },
    /// Show the cart
    Cart,
    /// Place an order for the current cart
    Checkout {
        #[arg(short, long)]
        address: String,

        #[arg(long)]
        phone: Option<String>,

        /// Payment method, e.g. `CASH` or `CARD`
        #[arg(long)]
        payment: Option<String>,
    },
    /// Show order history
    Orders,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry before the subscriber so the tracing layer has a client
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "food_delivery_client=info,food_delivery_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        e.capture();
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), CommandError> {
    let state = commands::connect(config)?;

    match cli.command {
        Commands::Open { path, settle } => commands::page::open(state, &path, settle).await?,
        Commands::Status => commands::page::status(&state).await?,
        Commands::Login { username, password } => {
            commands::account::login(state, &username, &password).await?;
        }
        Commands::Register {
            username,
            password,
            email,
            full_name,
            phone,
        } => {
            let registration = commands::account::RegisterArgs {
                username,
                password,
                email,
                full_name,
                phone,
            };
            commands::account::register(state, registration).await?;
        }
        Commands::Logout => commands::account::logout(state).await?,
        Commands::Menu { category, search } => {
            commands::shop::menu(state, category.as_deref(), search.as_deref()).await?;
        }
        Commands::Add { item_id } => commands::shop::add(state, item_id).await?,
        Commands::Cart => commands::shop::cart(&state).await?,
        Commands::Checkout {
            address,
            phone,
            payment,
        } => {
            commands::shop::checkout(state, &address, phone.as_deref(), payment.as_deref())
                .await?;
        }
        Commands::Orders => commands::account::orders(&state).await?,
    }
    Ok(())
}
