use clap::{Args, Parser, Subcommand};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "records-cli")]
#[command(about = "Command-line client for the contact records API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API is reachable
    Ping,
    /// List all records, newest first
    List,
    /// Show one record
    Get { id: String },
    /// Create a record
    Create(FieldArgs),
    /// Replace a record's fields
    Update {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a record
    Delete { id: String },
}

#[derive(Args)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

impl FieldArgs {
    fn to_json(&self) -> Value {
        let mut body = Map::new();
        if let Some(name) = &self.name {
            body.insert("name".into(), json!(name));
        }
        if let Some(email) = &self.email {
            body.insert("email".into(), json!(email));
        }
        if let Some(phone) = &self.phone {
            body.insert("phoneNumber".into(), json!(phone));
        }
        Value::Object(body)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match &cli.command {
        Commands::Ping => client.get(format!("{}/api/test", base)).send().await?,
        Commands::List => client.get(format!("{}/api/records", base)).send().await?,
        Commands::Get { id } => {
            client
                .get(format!("{}/api/records/{}", base, id))
                .send()
                .await?
        }
        Commands::Create(fields) => {
            client
                .post(format!("{}/api/records", base))
                .json(&fields.to_json())
                .send()
                .await?
        }
        Commands::Update { id, fields } => {
            client
                .put(format!("{}/api/records/{}", base, id))
                .json(&fields.to_json())
                .send()
                .await?
        }
        Commands::Delete { id } => {
            client
                .delete(format!("{}/api/records/{}", base, id))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) if status.is_success() => println!("{}", serde_json::to_string_pretty(&json)?),
        Ok(json) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("{}", serde_json::to_string_pretty(&json)?);
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("Response: {}", text);
            std::process::exit(1);
        }
    }
    Ok(())
}
