use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "chefito-cli")]
#[command(about = "Management CLI for the Chefito backend", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "CHEFITO_ADMIN_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Status,
    /// Show admission limits and tracked clients per route
    Admission,
    /// Evict expired client windows now
    Sweep,
    /// Show a user's entitlement
    Entitlement { user: String },
    /// Change a user's entitlement
    Grant {
        user: String,
        #[arg(long)]
        premium: Option<bool>,
        #[arg(long)]
        free: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let request = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::Admission => client.get(format!("{}/admin/admission", cli.url)),
        Commands::Sweep => client.post(format!("{}/admin/admission/sweep", cli.url)),
        Commands::Entitlement { user } => {
            client.get(format!("{}/admin/entitlements/{}", cli.url, user))
        }
        Commands::Grant { user, premium, free } => client
            .put(format!("{}/admin/entitlements/{}", cli.url, user))
            .json(&json!({ "premium": premium, "grant_free": free })),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("{}", text);
        }
        std::process::exit(1);
    }

    let body: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
