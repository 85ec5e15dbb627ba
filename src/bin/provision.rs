// src/bin/provision.rs
// DOCUMENTATION: Operator CLI for accounts and users
// PURPOSE: Create an account with its first user, or enable 2FA for a user

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crm_places::config::{init_db_pool, Config};
use crm_places::db::Repositories;
use crm_places::models::NewUser;
use crm_places::services::{credentials, totp, AuthService};

// --- ANSI colours for the terminal ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

#[derive(Parser, Debug)]
#[command(name = "crm-provision", about = "Provision CRM accounts and users")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new account and its first user
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: Option<String>,
        /// Also enable two factor authentication
        #[arg(long)]
        with_2fa: bool,
    },
    /// Enable 2FA for an existing user and print fresh recovery codes
    Enable2fa {
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.validate().map_err(anyhow::Error::msg)?;

    let pool = init_db_pool(&config)
        .await
        .context("could not connect to the database")?;
    let repos = Repositories::postgres(pool);

    match cli.command {
        Command::CreateUser {
            email,
            password,
            first_name,
            last_name,
            with_2fa,
        } => {
            if password.len() < 8 {
                bail!("password must be at least 8 characters");
            }
            if repos.users.find_by_email(&email).await?.is_some() {
                bail!("a user with email {} already exists", email);
            }

            let account = repos.users.create_account().await?;
            let user = repos
                .users
                .create_user(&NewUser {
                    account_id: account.id,
                    first_name,
                    last_name,
                    email: email.clone(),
                    password_hash: credentials::hash_password(&password)?,
                })
                .await?;

            println!(
                "{}{}Created account {} with user {} ({}){}",
                BOLD, GREEN, account.id, user.id, email, RESET
            );

            if with_2fa {
                enable_two_factor(&repos, user.id, &user.email).await?;
            }
        }
        Command::Enable2fa { email } => {
            let user = repos
                .users
                .find_by_email(&email)
                .await?
                .with_context(|| format!("no user with email {}", email))?;
            enable_two_factor(&repos, user.id, &user.email).await?;
        }
    }

    Ok(())
}

async fn enable_two_factor(repos: &Repositories, user_id: i64, email: &str) -> Result<()> {
    let (secret, codes) = AuthService::enable_two_factor(repos.users.as_ref(), user_id).await?;
    let uri = totp::provisioning_uri(&secret, email)?;

    println!("{}TOTP secret (base32):{} {}", BOLD, RESET, secret);
    println!("{}Authenticator URI:{} {}", BOLD, RESET, uri);
    println!("{}Recovery codes, each works once:{}", YELLOW, RESET);
    for code in codes {
        println!("  {}", code);
    }
    Ok(())
}
