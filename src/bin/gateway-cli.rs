use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

use credential_gateway::crypto::CipherKey;
use credential_gateway::gateway::SigninResponse;
use credential_gateway::upstream::SigninRequest;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Client and key tooling for the credential gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in through a running gateway
    Signin {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,

        #[arg(short, long, env = "JWT_SECRET", hide_env_values = true)]
        secret: String,

        #[arg(long, default_value = "")]
        ns: String,

        #[arg(long, default_value = "")]
        db: String,

        #[arg(long, default_value = "")]
        user: String,

        #[arg(long, default_value = "", hide_default_value = true)]
        pass: String,

        /// Decrypt the returned credentials with this key
        #[arg(long, env = "ENCRYPTION_KEY", hide_env_values = true)]
        key: Option<String>,
    },
    /// Encrypt a value with the gateway key
    Encrypt {
        plaintext: String,

        #[arg(short, long, env = "ENCRYPTION_KEY", hide_env_values = true)]
        key: String,
    },
    /// Decrypt a value produced by the gateway
    Decrypt {
        ciphertext: String,

        #[arg(short, long, env = "ENCRYPTION_KEY", hide_env_values = true)]
        key: String,
    },
    /// Generate a fresh base64 encryption key
    GenKey,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Signin { url, secret, ns, db, user, pass, key } => {
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", secret))?);

            let body = SigninRequest { ns, db, user, pass };
            let res = reqwest::Client::new()
                .post(format!("{}/signin", url.trim_end_matches('/')))
                .headers(headers)
                .json(&body)
                .send()
                .await?;

            let status = res.status();
            let json: Value = res.json().await?;
            if !status.is_success() {
                eprintln!("Error: gateway returned status {}", status);
            }

            match key {
                Some(key) if status.is_success() => {
                    let key = CipherKey::parse(&key)?;
                    let response: SigninResponse = serde_json::from_value(json)?;
                    let opened = response.credentials.open(&key)?;
                    println!("{}", response.message);
                    println!("{}", serde_json::to_string_pretty(&opened)?);
                }
                _ => println!("{}", serde_json::to_string_pretty(&json)?),
            }
        }
        Commands::Encrypt { plaintext, key } => {
            let key = CipherKey::parse(&key)?;
            println!("{}", key.encrypt(&plaintext)?);
        }
        Commands::Decrypt { ciphertext, key } => {
            let key = CipherKey::parse(&key)?;
            println!("{}", key.decrypt(&ciphertext)?);
        }
        Commands::GenKey => {
            println!("{}", CipherKey::generate().to_config_string());
        }
    }

    Ok(())
}
