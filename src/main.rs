// Finance Ops - streaming query CLI
//
//   finops query "<prompt>"   stream a query and print its events
//   finops result <query_id>  fetch the stored result of a finished query

use anyhow::{bail, Context, Result};
use finops::{logging, Config, ConnectionStatus, HttpTransport, QueryTransport, StreamingQueryClient};
use std::env;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("warn");

    let args: Vec<String> = env::args().collect();
    let config = Config::from_env().context("Failed to load configuration")?;

    match args.get(1).map(String::as_str) {
        Some("query") if args.len() > 2 => run_query(&config, &args[2..].join(" ")).await,
        Some("result") if args.len() == 3 => show_result(&config, &args[2]).await,
        _ => {
            eprintln!("Usage:");
            eprintln!("  finops query \"<prompt>\"");
            eprintln!("  finops result <query_id>");
            std::process::exit(2);
        }
    }
}

async fn run_query(config: &Config, prompt: &str) -> Result<()> {
    println!("📡 {} → {}", prompt, config.api_url);

    let client = StreamingQueryClient::new(HttpTransport::new(config.api_url.as_str()));
    let running = client.clone();
    let owned = prompt.to_string();
    let mut query = tokio::spawn(async move { running.send_query(&owned).await });

    let mut printed = 0;
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    let outcome = loop {
        tokio::select! {
            joined = &mut query => break joined.context("Query task panicked")?,
            _ = tokio::signal::ctrl_c() => {
                client.cancel_query();
                println!("\n⏹  Cancelled");
            }
            _ = ticker.tick() => {
                printed = print_new_events(&client, printed);
            }
        }
    };

    print_new_events(&client, printed);
    let state = outcome?;

    match state.status {
        ConnectionStatus::Error => bail!(
            "Query failed: {}",
            state.error.unwrap_or_else(|| "unknown error".to_string())
        ),
        _ => {
            if let Some(result) = state.result {
                println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
                println!("{}", result.data_analysis);
                for follow_up in &result.follow_up_prompts {
                    println!("  → {}", follow_up);
                }
                println!("\nquery_id: {}", result.query_id);
            }
            Ok(())
        }
    }
}

fn print_new_events<T: QueryTransport>(client: &StreamingQueryClient<T>, printed: usize) -> usize {
    let state = client.state();
    for event in state.events.iter().skip(printed) {
        match &event.message {
            Some(message) => println!("  [{}] {}", event.event_type, message),
            None => println!("  [{}]", event.event_type),
        }
    }
    state.events.len().max(printed)
}

async fn show_result(config: &Config, query_id: &str) -> Result<()> {
    let transport = HttpTransport::new(config.api_url.as_str());
    let result = transport
        .fetch_result(query_id)
        .await
        .with_context(|| format!("Failed to fetch result for {}", query_id))?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
