use clap::{Arg, Command};
use log::LevelFilter;
use phishguard::config::Config;
use phishguard::record::MemoryScanStore;
use phishguard::scanner::ScanEngine;
use phishguard::summary::{GeminiSummarizer, Summarizer};
use std::io::Read;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let matches = Command::new("phishguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Phishing email risk scanner combining keyword heuristics with URL threat-list, antivirus-aggregation and domain-registration lookups")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("/etc/phishguard.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .value_name("FILE")
                .help("Email text file to scan (reads stdin when omitted)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("principal")
                .short('p')
                .long("principal")
                .value_name("ID")
                .help("Principal id that owns the resulting scan record")
                .default_value("local"),
        )
        .arg(
            Arg::new("summarize")
                .long("summarize")
                .help("Also generate a narrative summary of the verdict")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        if let Err(e) = Config::default().save(generate_path) {
            eprintln!("Error generating configuration: {e}");
            process::exit(1);
        }
        println!("Default configuration written to {generate_path}");
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    let email_text = match read_email_text(matches.get_one::<String>("email")) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading email text: {e}");
            process::exit(1);
        }
    };

    let store = Arc::new(MemoryScanStore::new());
    let engine = match ScanEngine::from_config(&config, store) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error building scan engine: {e}");
            process::exit(1);
        }
    };

    let principal = matches.get_one::<String>("principal").unwrap();
    let record = match engine.submit_scan(&email_text, principal).await {
        Ok(record) => record,
        Err(e) => {
            eprintln!("Scan failed: {e}");
            process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&record) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error rendering scan record: {e}");
            process::exit(1);
        }
    }

    if matches.get_flag("summarize") {
        match &config.summary {
            Some(summary_config) => {
                let result = GeminiSummarizer::new(
                    &summary_config.api_key,
                    &summary_config.endpoint,
                    config.timeout_seconds,
                );
                match result {
                    Ok(summarizer) => {
                        match summarizer
                            .summarize(
                                &record.email_preview,
                                record.assessment.score,
                                &record.assessment.signals.matched_keywords,
                            )
                            .await
                        {
                            Ok(summary) => println!("\nSummary: {summary}"),
                            Err(e) => eprintln!("Summary generation failed: {e}"),
                        }
                    }
                    Err(e) => eprintln!("Error building summarizer: {e}"),
                }
            }
            None => eprintln!("No summary source configured, skipping"),
        }
    }
}

fn read_email_text(path: Option<&String>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
