use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "node-cli")]
#[command(about = "Command-line client for the node-bridge API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:9981")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show server name, version and status
    Server,
    /// List the project tree, or one level under --parent
    List {
        #[arg(short, long)]
        parent: Option<String>,
        /// Name glob, e.g. `noise*`
        #[arg(long)]
        pattern: Option<String>,
        /// Include parameters and connections
        #[arg(long)]
        properties: bool,
    },
    /// Show one node in detail
    Get { path: String },
    /// Create a node under the project root
    Create {
        family: String,
        #[arg(value_name = "TYPE")]
        node_type: String,
        #[arg(short, long)]
        name: Option<String>,
        /// Parameter assignment `name=value`; repeatable
        #[arg(short, long = "param")]
        params: Vec<String>,
    },
    /// Set parameters on a node
    Update {
        path: String,
        #[arg(short, long = "param", required = true)]
        params: Vec<String>,
    },
    /// Connect an output of one node to an input of another
    Connect {
        from: String,
        to: String,
        #[arg(long, default_value_t = 0)]
        out_index: usize,
        #[arg(long, default_value_t = 0)]
        to_index: usize,
        #[arg(long)]
        clear: bool,
    },
    /// Delete a node and everything below it
    Delete { path: String },
    /// Show default parameters for a node type
    Defaults {
        family: String,
        #[arg(value_name = "TYPE")]
        node_type: String,
    },
    /// List creatable node types
    Types,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Server => client.get(format!("{}/api/server", base)).send().await?,
        Commands::List { parent, pattern, properties } => {
            let mut query = Vec::new();
            if let Some(parent) = parent {
                query.push(("parentPath", parent));
            }
            if let Some(pattern) = pattern {
                query.push(("pattern", pattern));
            }
            if properties {
                query.push(("includeProperties", "true".to_string()));
            }
            client.get(format!("{}/api/nodes", base)).query(&query).send().await?
        }
        Commands::Get { path } => client.get(node_url(base, &path)).send().await?,
        Commands::Create { family, node_type, name, params } => {
            let body = json!({
                "nodeFamily": family,
                "nodeType": node_type,
                "nodeName": name.unwrap_or_default(),
                "parameters": parse_assignments(&params)?,
            });
            client.post(format!("{}/api/nodes", base)).json(&body).send().await?
        }
        Commands::Update { path, params } => {
            let body = json!({ "parameters": parse_assignments(&params)? });
            client.patch(node_url(base, &path)).json(&body).send().await?
        }
        Commands::Connect { from, to, out_index, to_index, clear } => {
            let body = json!({
                "connection": {
                    "fromNodePath": from,
                    "toNodePath": to,
                    "outIndex": out_index,
                    "toIndex": to_index,
                    "clearExisting": clear,
                }
            });
            client.patch(node_url(base, &to)).json(&body).send().await?
        }
        Commands::Delete { path } => client.delete(node_url(base, &path)).send().await?,
        Commands::Defaults { family, node_type } => {
            client
                .get(format!("{}/api/nodes/default-parameters", base))
                .query(&[("nodeFamily", family), ("nodeType", node_type)])
                .send()
                .await?
        }
        Commands::Types => client.get(format!("{}/api/node-types", base)).send().await?,
    };

    print_response(res).await
}

fn node_url(base: &str, path: &str) -> String {
    format!("{}/api/nodes/{}", base, path.trim_start_matches('/'))
}

/// `name=value` pairs; values are read as JSON when they parse, else as text.
fn parse_assignments(params: &[String]) -> Result<Map<String, Value>, String> {
    let mut map = Map::new();
    for param in params {
        let (name, raw) = param
            .split_once('=')
            .ok_or_else(|| format!("Expected name=value, got '{}'", param))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        map.insert(name.trim().to_string(), value);
    }
    Ok(map)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
