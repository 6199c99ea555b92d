use clap::Parser;
use funnel_topics::config::resolve_api_key;
use funnel_topics::export::{pages_to_json, render_tree, rows_to_json, rows_to_jsonl};
use funnel_topics::http::ReqwestTransport;
use funnel_topics::{Pipeline, Result, SessionContext};
use std::sync::Arc;

mod args;
use args::{Args, Command, GenerateArgs, OutputFormat};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::debug!("Failed with {:?} error", e.kind());
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = args.load_config()?;
    let transport = Arc::new(ReqwestTransport::new().map_err(|e| funnel_topics::Error::Config(e.to_string()))?);
    let pipeline = Pipeline::from_config(transport, &config)?;

    match &args.command {
        Command::Scrape { url } => {
            let output = pipeline.scrape(url).await?;
            println!("{}", pages_to_json(&output.pages)?);
            println!("Start page text: {} characters", output.text.chars().count());
        }
        Command::Analyze { url } => {
            let credential = resolve_api_key(args.api_key.as_deref())?;
            let scrape = pipeline.analyze_site(url, &credential).await?;
            println!("{}", serde_json::to_string_pretty(&scrape.profile)?);
            println!();
            print!("{}", scrape.profile.summary_text());
        }
        Command::Generate(generate) => {
            let credential = resolve_api_key(args.api_key.as_deref())?;
            generate_topics(&pipeline, credential, generate).await?;
        }
    }
    Ok(())
}

async fn generate_topics(pipeline: &Pipeline, credential: String, args: &GenerateArgs) -> Result<()> {
    let session = SessionContext::new(credential, args.business_details()?);
    let date = args.date.unwrap_or_else(|| chrono::Local::now().date_naive());

    let start_time = std::time::Instant::now();
    let output = pipeline.run(session, args.url.as_deref(), date).await?;

    let filter = args.row_filter();
    let rows = filter.apply(&output.rows);
    ::log::info!(
        "Generation complete - {} of {} rows kept in {:.2} seconds",
        rows.len(),
        output.rows.len(),
        start_time.elapsed().as_secs_f64()
    );

    match args.format {
        OutputFormat::Rows => println!("{}", rows_to_json(&rows)?),
        OutputFormat::Jsonl => print!("{}", rows_to_jsonl(&rows)?),
        OutputFormat::Tree => println!("{}", serde_json::to_string_pretty(&output.tree)?),
        OutputFormat::Text => print!("{}", render_tree(&output.tree)),
    }
    Ok(())
}
