use std::path::PathBuf;

use clap::{Parser, Subcommand};

use request_pipeline::auth::{ttl_from_hours, TokenVerifier};
use request_pipeline::config::{load_config, AppConfig};

#[derive(Parser)]
#[command(name = "token-cli")]
#[command(about = "Mint and inspect bearer tokens for the API", long_about = None)]
struct Cli {
    /// Server configuration file; supplies the default secret and lifetime
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a token for a user
    Mint {
        /// User public id (token subject)
        #[arg(long)]
        subject: String,

        /// Token lifetime in hours [default: jwt.token_ttl_hours]
        #[arg(long)]
        ttl_hours: Option<i64>,

        /// Signing secret [default: jwt.secret]
        #[arg(long)]
        secret: Option<String>,
    },
    /// Verify a token and print its claims
    Inspect {
        token: String,

        /// Signing secret [default: jwt.secret]
        #[arg(long)]
        secret: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Mint {
            subject,
            ttl_hours,
            secret,
        } => {
            let hours = match ttl_hours {
                Some(hours) => hours,
                None => i64::try_from(config.jwt.token_ttl_hours)?,
            };
            let ttl = ttl_from_hours(hours)?;
            let secret = secret.unwrap_or(config.jwt.secret);
            let token = TokenVerifier::new(secret.as_bytes()).issue(&subject, ttl)?;
            println!("{}", token);
        }
        Commands::Inspect { token, secret } => {
            let secret = secret.unwrap_or(config.jwt.secret);
            match TokenVerifier::new(secret.as_bytes()).verify(&token) {
                Ok(claims) => println!("{}", serde_json::to_string_pretty(&claims)?),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
