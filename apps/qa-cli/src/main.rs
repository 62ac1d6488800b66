use clap::Parser;
use qa_client::{build_client, ClientConfig, ClientError};

mod commands;
mod telemetry;

const EXIT_FAILURE: i32 = 1;
const EXIT_AUTH: i32 = 3;

#[derive(Parser)]
#[command(name = "qa")]
#[command(about = "Command-line access to the QA accreditation API")]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_json);

    // QA_API_URL and friends come from the environment
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    let client = match build_client(config).build() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to build API client: {e}");
            std::process::exit(EXIT_FAILURE);
        }
    };

    match commands::run(&client, cli.command).await {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("❌ Could not render output: {e}");
                std::process::exit(EXIT_FAILURE);
            }
        },
        Err(e) if e.is_auth_failure() => {
            eprintln!("🔒 {e}: please log in with `qa login`");
            std::process::exit(EXIT_AUTH);
        }
        Err(ClientError::InvalidCredentials { detail }) => {
            eprintln!("❌ Login failed: {detail}");
            std::process::exit(EXIT_AUTH);
        }
        Err(e) => {
            eprintln!("❌ {} ({})", e, e.code());
            std::process::exit(EXIT_FAILURE);
        }
    }
}
