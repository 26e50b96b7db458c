use std::path::PathBuf;

use clap::{Parser, Subcommand};
use prep::{PrepConfig, PrepContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "prep", about = "Embedding store and training set preparation")]
struct Cli {
    /// Path to config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Embedding file, overrides the config
    #[arg(long, global = true)]
    embeddings: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the embedding store and print its occupancy.
    Stats,

    /// Align the tokens and labels files and summarize the training set.
    Align {
        /// Tokens file, overrides the config
        #[arg(long)]
        tokens: Option<PathBuf>,
        /// Labels file, overrides the config
        #[arg(long)]
        labels: Option<PathBuf>,
    },

    /// Tokenize a request and look every token up.
    Embed {
        /// Request text (joined with spaces)
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Print the effective configuration.
    Config,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = PrepConfig::load_or_default(cli.config.as_deref())?;
    if let Some(path) = cli.embeddings {
        config.embedding_file = path;
    }

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Stats => {
            let ctx = PrepContext::from_config(config)?;
            let stats = ctx.store().stats();
            println!("entries:          {}", stats.entries);
            println!("buckets:          {}", stats.buckets);
            println!("occupied buckets: {}", stats.occupied_buckets);
            println!("longest chain:    {}", stats.longest_chain);
            println!("load factor:      {:.4}", stats.load_factor);
            println!("skipped lines:    {}", stats.skipped_lines);
        }
        Commands::Align { tokens, labels } => {
            if let Some(path) = tokens {
                config.tokens_file = path;
            }
            if let Some(path) = labels {
                config.labels_file = path;
            }
            let mut ctx = PrepContext::from_config(config)?;
            let set = ctx.load_training_set()?;
            let stats = set.stats();
            println!(
                "{} examples, {} pairs from {} lines ({} OOV pairs, {} lines dropped)",
                set.len(),
                stats.pairs,
                stats.lines,
                stats.oov_pairs,
                stats.dropped_lines
            );
            for warning in set.warnings() {
                println!("warning: {warning}");
            }
        }
        Commands::Embed { text } => {
            let prompt = text.join(" ");
            let ctx = PrepContext::from_config(config)?;
            let embedded = ctx.embed_text(&prompt);
            println!("> {prompt}");
            for token in &embedded.tokens {
                match token.vector {
                    Some(v) => println!("{:>16}  [{}]", token.token, preview(v)),
                    None => println!("{:>16}  (no embedding)", token.token),
                }
            }
            if embedded.truncated {
                println!(
                    "Watch out, your request is exceeding the {} tokens limit!",
                    ctx.tokenizer().max_tokens()
                );
            }
            info!(
                tokens = embedded.len(),
                misses = embedded.misses().count(),
                "request embedded"
            );
        }
    }
    Ok(())
}

/// First few components, for display.
fn preview(v: &[f32]) -> String {
    let mut parts: Vec<String> = v.iter().take(4).map(|x| format!("{x:.3}")).collect();
    if v.len() > 4 {
        parts.push("..".to_string());
    }
    parts.join(", ")
}
