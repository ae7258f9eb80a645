//! Command-line front end: each subcommand is a handler over the library API.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use reqwest::Method;

use panel_client::api::models::{BotDraft, ReservationDraft, ServiceDraft};
use panel_client::{Authenticator, PanelApi, RequestOptions, SessionEvent};

#[derive(Debug, Parser)]
#[command(name = "panel", version, about = "Bookings admin panel client", long_about = None)]
pub struct Cli {
    /// Base URL of the panel API [default: PANEL_API_URL, or the local backend]
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session file holding the token pair
    #[arg(long, env = "PANEL_SESSION_FILE", global = true)]
    pub session_file: Option<std::path::PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the token pair
    Login(LoginArgs),
    /// End the session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Exchange the refresh token for a new access token
    Refresh,
    /// Dashboard statistics
    Stats,
    /// Manage bots
    #[command(subcommand)]
    Bots(BotsCommand),
    /// Manage services
    #[command(subcommand)]
    Services(ServicesCommand),
    /// Manage reservations
    #[command(subcommand)]
    Reservations(ReservationsCommand),
    /// Send a raw authenticated request and print the response body
    Request(RequestArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long, short)]
    pub username: String,

    #[arg(long, short, env = "PANEL_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Use the dashboard login, which also reports the dashboard type
    #[arg(long)]
    pub dashboard: bool,
}

#[derive(Debug, Subcommand)]
pub enum BotsCommand {
    List,
    Show { id: i64 },
    Create(BotArgs),
    Update {
        id: i64,
        #[command(flatten)]
        bot: BotArgs,
    },
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct BotArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long)]
    pub inactive: bool,

    #[arg(long)]
    pub system_prompt: Option<String>,

    #[arg(long)]
    pub whatsapp_phone_id: Option<String>,
}

impl From<BotArgs> for BotDraft {
    fn from(args: BotArgs) -> Self {
        BotDraft {
            name: args.name,
            description: args.description,
            active: !args.inactive,
            system_prompt: args.system_prompt,
            whatsapp_phone_id: args.whatsapp_phone_id,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ServicesCommand {
    List,
    Create {
        #[arg(long)]
        bot: i64,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ReservationsCommand {
    List,
    Create {
        #[arg(long)]
        bot: i64,
        #[arg(long)]
        service: Option<i64>,
        #[arg(long)]
        customer: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// Start time, RFC 3339
        #[arg(long)]
        starts_at: DateTime<Utc>,
        /// End time, RFC 3339
        #[arg(long)]
        ends_at: DateTime<Utc>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    Cancel { id: i64 },
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// HTTP method
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// Endpoint relative to the API URL, or an absolute URL
    pub endpoint: String,

    /// Pre-serialized JSON body
    #[arg(long, short)]
    pub data: Option<String>,
}

pub async fn run(command: Command, auth: &Authenticator, api: &PanelApi, json: bool) -> Result<()> {
    match command {
        Command::Login(args) => {
            if args.dashboard {
                let config = auth.dashboard_login(&args.username, &args.password).await?;
                println!("[OK] Logged in ({})", config.dashboard_type.as_str());
            } else {
                auth.login(&args.username, &args.password).await?;
                println!("[OK] Logged in as {}", args.username);
            }
        }
        Command::Logout => {
            auth.logout().await;
            println!("[OK] Logged out");
        }
        Command::Whoami => {
            let profile = api.profile().reload().await?;
            if json {
                print_json(&profile)?;
            } else {
                println!("{} ({})", profile.display_name(), profile.user.username);
            }
        }
        Command::Refresh => {
            api.gateway().refresh().await.context("Token refresh failed")?;
            println!("[OK] Access token refreshed");
        }
        Command::Stats => {
            let data = api.dashboard().load().await?;
            if json {
                print_json(&data.stats)?;
            } else {
                let stats = &data.stats;
                println!("Active bots:          {}", stats.active_bots);
                println!("Active reservations:  {}", stats.active_reservations);
                println!("Pending reservations: {}", stats.pending_reservations);
                println!("Bookings this month:  {}", stats.monthly_bookings);
                for r in &stats.upcoming {
                    println!("  {}  {}  {}", r.starts_at, r.customer_name, r.status.as_str());
                }
            }
        }
        Command::Bots(cmd) => run_bots(cmd, api, json).await?,
        Command::Services(cmd) => run_services(cmd, api, json).await?,
        Command::Reservations(cmd) => run_reservations(cmd, api, json).await?,
        Command::Request(args) => {
            let method = Method::from_bytes(args.method.to_uppercase().as_bytes())
                .with_context(|| format!("Invalid HTTP method '{}'", args.method))?;
            let mut options = RequestOptions::new(method);
            if let Some(data) = args.data {
                options = options.body(data);
            }

            let response = api.gateway().send(&args.endpoint, options).await?;
            let status = response.status();
            let body = response.text().await?;
            println!("{}", body);
            if !status.is_success() {
                bail!("Request returned {}", status);
            }
        }
    }

    Ok(())
}

async fn run_bots(cmd: BotsCommand, api: &PanelApi, json: bool) -> Result<()> {
    let bots = api.bots();
    match cmd {
        BotsCommand::List => {
            let list = bots.list().await?;
            if json {
                return print_json(&list);
            }
            for bot in list {
                let state = match (bot.active, bot.blocked) {
                    (_, true) => "blocked",
                    (true, false) => "active",
                    (false, false) => "inactive",
                };
                println!("{:>5}  {:<30}  {}", bot.id, bot.name, state);
            }
        }
        BotsCommand::Show { id } => print_json(&bots.get(id).await?)?,
        BotsCommand::Create(args) => {
            let bot = bots.create(&args.into()).await?;
            println!("[OK] Created bot {}", bot.id);
        }
        BotsCommand::Update { id, bot } => {
            bots.update(id, &bot.into()).await?;
            println!("[OK] Updated bot {}", id);
        }
        BotsCommand::Delete { id } => {
            bots.delete(id).await?;
            println!("[OK] Deleted bot {}", id);
        }
    }
    Ok(())
}

async fn run_services(cmd: ServicesCommand, api: &PanelApi, json: bool) -> Result<()> {
    let services = api.services();
    match cmd {
        ServicesCommand::List => {
            let list = services.list().await?;
            if json {
                return print_json(&list);
            }
            for service in list {
                println!(
                    "{:>5}  {:<30}  {:>10}  bot {}",
                    service.id, service.name, service.price, service.bot
                );
            }
        }
        ServicesCommand::Create {
            bot,
            name,
            description,
            price,
        } => {
            let service = services
                .create(&ServiceDraft {
                    name,
                    description,
                    price,
                    bot,
                })
                .await?;
            println!("[OK] Created service {}", service.id);
        }
    }
    Ok(())
}

async fn run_reservations(cmd: ReservationsCommand, api: &PanelApi, json: bool) -> Result<()> {
    let reservations = api.reservations();
    match cmd {
        ReservationsCommand::List => {
            let list = reservations.list().await?;
            if json {
                return print_json(&list);
            }
            for r in list {
                println!(
                    "{:>5}  {}  {:<25}  {}",
                    r.id,
                    r.starts_at,
                    r.customer_name,
                    r.status.as_str()
                );
            }
        }
        ReservationsCommand::Create {
            bot,
            service,
            customer,
            phone,
            starts_at,
            ends_at,
            notes,
        } => {
            if ends_at <= starts_at {
                bail!("--ends-at must be after --starts-at");
            }
            let reservation = reservations
                .create(&ReservationDraft {
                    bot,
                    service,
                    customer_name: customer,
                    customer_phone: phone,
                    starts_at,
                    ends_at,
                    notes,
                })
                .await?;
            println!("[OK] Created reservation {}", reservation.id);
        }
        ReservationsCommand::Cancel { id } => {
            reservations.cancel(id).await?;
            println!("[OK] Cancelled reservation {}", id);
        }
    }
    Ok(())
}

/// Whether the session ended on its own during this run.
///
/// A logout can itself trip a failed refresh; that `Expired` is followed by
/// `LoggedOut` and is not worth reporting.
pub fn session_expired(events: &[SessionEvent]) -> bool {
    match events.iter().rposition(|e| *e == SessionEvent::Expired) {
        Some(i) => !events[i..].contains(&SessionEvent::LoggedOut),
        None => false,
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
