use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;

use obs_tester::http::headers::{parse_duration, X_SERVICE_DURATION};

#[derive(Parser)]
#[command(name = "obs-ctl")]
#[command(about = "Control and inspect a running obs-tester", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Echo request headers back
    Echo,
    /// Proxy a GET through the tester to host[:port][/path]
    Proxy {
        target: String,
        #[arg(long, default_value = "http")]
        proto: String,
    },
    /// Set the injected error percentage
    Errors {
        #[arg(allow_hyphen_values = true)]
        rate: i64,
    },
    /// Set the injected latency in milliseconds
    Latency {
        #[arg(allow_hyphen_values = true)]
        ms: i64,
    },
    /// Terminate the tester process
    Crash { message: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let (method, url) = endpoint(&cli.url, &cli.command);
    let request = client.request(method, url);

    if let Commands::Crash { .. } = cli.command {
        // The process exits before answering.
        if let Err(e) = request.send().await {
            println!("Crash requested: {}", e);
        }
        return Ok(());
    }

    print_response(request.send().await?).await
}

/// Method and URL for a command against the tester at `base`.
fn endpoint(base: &str, command: &Commands) -> (Method, String) {
    let base = base.trim_end_matches('/');
    match command {
        Commands::Echo => (Method::GET, format!("{}/", base)),
        Commands::Proxy { target, proto } => (
            Method::GET,
            format!("{}/p/{}/{}", base, proto, target.trim_start_matches('/')),
        ),
        Commands::Errors { rate } => (Method::POST, format!("{}/errors/{}", base, rate)),
        Commands::Latency { ms } => (Method::POST, format!("{}/latency/{}", base, ms)),
        Commands::Crash { message } => (Method::POST, format!("{}/crash/{}", base, message)),
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    println!("Status: {}", res.status());

    for (name, value) in res.headers() {
        let name = name.as_str();
        if name.starts_with("x-") || name == "proxied-by" {
            println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
        }
    }
    if let Some(elapsed) = res
        .headers()
        .get(X_SERVICE_DURATION.as_str())
        .and_then(|v| v.to_str().ok())
        .and_then(parse_duration)
    {
        println!("Service time: {:?}", elapsed);
    }

    let text = res.text().await?;
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
