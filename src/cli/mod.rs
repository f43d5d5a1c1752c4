//! CLI module for Guaxinim.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::assistant::BrewReport;
use crate::config::{RankingField, RetrievalSettings, ReturnMode};
use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};

/// Upper bound for `-k` and `--limit`.
const MAX_RESULTS: u64 = 100;

/// Guaxinim - Coffee Assistant
///
/// Answers coffee questions from a local knowledge base of articles and
/// video transcripts, writes brewing guides and diagnoses brews.
#[derive(Parser, Debug)]
#[command(name = "guaxinim")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "GUAXINIM_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the configured retrieval settings.
#[derive(Args, Debug, Clone, Default)]
pub struct RetrievalArgs {
    /// Field to rank by (chunks, summary)
    #[arg(long)]
    pub field: Option<RankingField>,

    /// What to return as context (chunks, whole-file)
    #[arg(long)]
    pub mode: Option<ReturnMode>,

    /// Number of primary matches
    #[arg(short = 'k', long, value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_RESULTS))]
    pub k: Option<usize>,

    /// Maximum distinct documents in whole-file mode
    #[arg(long)]
    pub max_files: Option<usize>,
}

impl RetrievalArgs {
    /// Apply these overrides on top of `base`.
    pub fn apply(&self, base: &RetrievalSettings) -> RetrievalSettings {
        RetrievalSettings {
            ranking_field: self.field.unwrap_or(base.ranking_field),
            return_mode: self.mode.unwrap_or(base.return_mode),
            k: self.k.unwrap_or(base.k),
            max_whole_files: self.max_files.unwrap_or(base.max_whole_files),
        }
    }
}

/// Parameters of a brew that needs fixing.
#[derive(Args, Debug, Clone)]
pub struct ImproveArgs {
    /// What went wrong (e.g. "too bitter")
    #[arg(long)]
    pub issue: String,

    /// Brewing method used
    #[arg(short, long, default_value = "V60")]
    pub method: String,

    /// Coffee amount in grams
    #[arg(long)]
    pub coffee: Option<f32>,

    /// Water amount in ml
    #[arg(long)]
    pub water: Option<f32>,

    /// Bean type or origin
    #[arg(long)]
    pub bean: Option<String>,

    /// Total extraction time in seconds
    #[arg(long)]
    pub time: Option<u32>,

    /// Water temperature in Celsius
    #[arg(long)]
    pub temp: Option<f32>,

    /// Grind size (fine, medium, coarse)
    #[arg(long)]
    pub grind: Option<String>,

    /// Bloom time in seconds
    #[arg(long)]
    pub bloom: Option<u32>,

    /// Number of pours
    #[arg(long)]
    pub pours: Option<u32>,

    /// Water per pour in ml
    #[arg(long)]
    pub pour_amount: Option<f32>,

    /// Anything else worth knowing
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<&ImproveArgs> for BrewReport {
    fn from(args: &ImproveArgs) -> Self {
        BrewReport {
            issue: args.issue.clone(),
            brewing_method: args.method.clone(),
            coffee_grams: args.coffee,
            water_ml: args.water,
            bean: args.bean.clone(),
            extraction_seconds: args.time,
            water_temperature: args.temp,
            grind: args.grind.clone(),
            bloom_seconds: args.bloom,
            pours: args.pours,
            pour_ml: args.pour_amount,
            notes: args.notes.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show raw chunk, title and summary matches for a query
    Search {
        /// Search query
        query: String,

        /// Maximum number of results per field
        #[arg(short, long, default_value = "5", value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_RESULTS))]
        limit: usize,
    },

    /// Show the context and sources retrieval assembles for a query
    Context {
        /// Search query
        query: String,

        #[command(flatten)]
        retrieval: RetrievalArgs,
    },

    /// Ask a coffee question
    Ask {
        /// The question to ask
        question: String,

        #[command(flatten)]
        retrieval: RetrievalArgs,

        /// LLM model to use for response generation
        #[arg(long)]
        model: Option<String>,
    },

    /// Start an interactive question session
    Chat {
        #[command(flatten)]
        retrieval: RetrievalArgs,

        /// LLM model to use
        #[arg(long)]
        model: Option<String>,
    },

    /// Step-by-step guide for a brewing method
    Guide {
        /// Brewing method (lists known methods when omitted)
        method: Option<String>,
    },

    /// Suggestions for improving a brew
    Improve(ImproveArgs),

    /// List tags by frequency
    Tags {
        /// Show at most this many tags
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List documents carrying a tag
    Browse {
        /// Tag to browse
        tag: String,

        /// Maximum number of documents
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Chunk and embed raw records into the documents directory
    Embed {
        /// Raw records directory (defaults to the configured one)
        #[arg(short, long)]
        input: Option<String>,

        /// Output documents directory (defaults to the configured one)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Remove every cached response
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
