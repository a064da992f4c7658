use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use regdoc::config::{self, ClassifierConfig};
use regdoc::gateway::openrouter::OpenRouterClient;
use regdoc::ingestion::process_file;
use regdoc::pipeline::classifier::classify_document;
use regdoc::pipeline::prompt::PromptLibrary;
use regdoc::storage::{save_review, AuditStore, JsonAuditStore};
use regdoc::RegdocError;

#[derive(Parser)]
#[command(name = "regdoc", version, about = "Regulatory document sensitivity classifier")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify one or more documents (PDF or image)
    Classify {
        /// Files to classify
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Save a review entry to the audit log
        #[arg(long)]
        save: bool,
        /// Override the AI category in the saved entry
        #[arg(long, value_name = "CATEGORY")]
        override_category: Option<String>,
        /// Reviewer comment stored with the entry
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Browse the audit history
    History {
        /// Show only the latest entry for this filename
        #[arg(long)]
        file: Option<String>,
    },
}

fn main() -> Result<(), RegdocError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let cli = Cli::parse();
    match cli.command {
        Command::Classify {
            files,
            save,
            override_category,
            comment,
        } => classify(files, save, override_category.as_deref(), &comment),
        Command::History { file } => history(file.as_deref()),
    }
}

fn classify(
    files: Vec<PathBuf>,
    save: bool,
    override_category: Option<&str>,
    comment: &str,
) -> Result<(), RegdocError> {
    let client = OpenRouterClient::from_env()?;
    let prompts = PromptLibrary::load(&config::prompts_dir());
    let cfg = ClassifierConfig::default();
    let store = JsonAuditStore::new(config::history_path());

    for path in files {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(&path)?;
        let doc = process_file(&bytes, &filename);

        println!("== {filename}");
        println!(
            "pages: {}  images: {}  legible: {}",
            doc.num_pages,
            doc.num_images,
            if doc.legible { "yes" } else { "check manually" }
        );

        let result = classify_document(&doc, &client, &prompts, &cfg)?;

        println!("category:   {}", result.category());
        println!("unsafe:     {}", if result.label.unsafe_content { "yes" } else { "no" });
        println!("kid-safe:   {}", if result.kid_safe { "yes" } else { "no" });
        println!("confidence: {:.0}%", result.confidence * 100.0);
        println!("\n{}", result.reasoning);
        if result.citations.is_empty() {
            println!("\n(no citations)");
        } else {
            println!("\ncitations:");
            for c in &result.citations {
                println!("  p{}: {}", c.page, c.reason);
            }
        }

        if save {
            let final_category = override_category
                .map(str::to_string)
                .unwrap_or_else(|| result.category());
            let entry = save_review(&store, &doc, &result, &final_category, comment)?;
            println!("\nsaved review: {} -> {}", entry.ai_category, entry.final_category);
        }
        println!();
    }
    Ok(())
}

fn history(file: Option<&str>) -> Result<(), RegdocError> {
    let store = JsonAuditStore::new(config::history_path());
    let entries = store.read_all()?;
    if entries.is_empty() {
        println!("No documents reviewed yet.");
        return Ok(());
    }

    if let Some(name) = file {
        // Latest entry for one filename; timestamps are RFC 3339 so the
        // lexicographic maximum is the newest.
        let latest = entries
            .iter()
            .filter(|e| e.filename == name)
            .max_by(|a, b| a.timestamp.cmp(&b.timestamp));
        match latest {
            None => println!("No entries for {name}."),
            Some(e) => {
                println!("latest review for {name}");
                println!("ai category:    {}", e.ai_category);
                println!("final category: {}", e.final_category);
                println!("unsafe:         {}", e.unsafe_content);
                println!("kid-safe:       {}", e.kid_safe);
                println!("confidence:     {:.2}", e.confidence);
                let comment = if e.reviewer_comment.is_empty() {
                    "-"
                } else {
                    e.reviewer_comment.as_str()
                };
                println!("comment:        {comment}");
                println!("timestamp:      {}", e.timestamp);
            }
        }
        return Ok(());
    }

    for e in &entries {
        println!(
            "{}  {}  {} -> {}  conf {:.2}",
            e.timestamp, e.filename, e.ai_category, e.final_category, e.confidence
        );
    }

    let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
    for e in &entries {
        *by_category.entry(e.final_category.as_str()).or_default() += 1;
    }
    println!("\nfinal category counts:");
    for (category, count) in by_category {
        println!("  {category}: {count}");
    }
    println!(
        "unsafe: {}  kid-safe: {}  total: {}",
        entries.iter().filter(|e| e.unsafe_content).count(),
        entries.iter().filter(|e| e.kid_safe).count(),
        entries.len()
    );
    Ok(())
}
