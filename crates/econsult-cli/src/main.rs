mod ingest;
mod report;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use econsult_analysis::{
    Granularity, LexiconClassifier, StopWords, TimelineOptions, WordCloudGenerator,
    WordCloudOptions,
};
use econsult_core::AppConfig;
use econsult_store::{CommentFilter, CommentStore};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "econsult-cli")]
#[command(about = "eConsult comment store command line interface")]
struct Cli {
    /// Comment journal to read and append to (defaults to `ECONSULT_JOURNAL_PATH`)
    #[arg(long, global = true)]
    journal: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate and append classified comments from a JSON-lines file
    Ingest {
        /// File with one comment object per line
        file: PathBuf,
        /// Validate every line without appending anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Classify raw comment text (one comment per line) and append it
    Analyze {
        /// Plain-text file, one comment per line
        file: PathBuf,
        /// Language of the comments (defaults to `ECONSULT_DEFAULT_LANGUAGE`)
        #[arg(long)]
        language: Option<String>,
    },
    /// Show overall sentiment counts
    Summary,
    /// Show sentiment counts over time
    Timeline {
        /// Bucket size: day, week or month
        #[arg(long, default_value = "day")]
        granularity: Granularity,
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Omit buckets without comments
        #[arg(long)]
        skip_empty: bool,
    },
    /// Show sentiment counts per aspect
    Aspects,
    /// Show comment counts per language and flag underrepresented ones
    Languages {
        /// Languages with fewer comments than this are flagged
        #[arg(long)]
        threshold: Option<u64>,
    },
    /// Show the sentiment-tagged word cloud for all stored comments
    Wordcloud {
        /// Maximum number of words to list
        #[arg(long)]
        max_words: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = econsult_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("econsult-cli: no command given; run with --help for usage");
        return Ok(());
    };

    let journal = cli
        .journal
        .or_else(|| config.journal_path.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("no journal given; pass --journal or set ECONSULT_JOURNAL_PATH")
        })?;
    let store = CommentStore::open(&journal)?;
    tracing::debug!(
        journal = %journal.display(),
        comments = store.count()?,
        "opened comment journal"
    );

    run(&store, &config, command)
}

fn run(store: &CommentStore, config: &AppConfig, command: Commands) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    match command {
        Commands::Ingest { file, dry_run } => {
            let report = ingest::ingest_file(store, &file, dry_run)?;
            report.write(&mut out, dry_run)?;
        }
        Commands::Analyze { file, language } => {
            let language = language.unwrap_or_else(|| config.default_language.clone());
            let report = ingest::analyze_file(store, &LexiconClassifier, &file, &language)?;
            report.write(&mut out, false)?;
        }
        Commands::Summary => report::write_summary(&mut out, &store.summary()?)?,
        Commands::Timeline {
            granularity,
            from,
            to,
            skip_empty,
        } => {
            if let (Some(from), Some(to)) = (from, to) {
                anyhow::ensure!(from <= to, "--from ({from}) must not be after --to ({to})");
            }
            let options = TimelineOptions {
                granularity,
                from,
                to,
                skip_empty,
            };
            report::write_timeline(&mut out, &store.timeline(&options)?)?;
        }
        Commands::Aspects => report::write_aspects(&mut out, &store.aspects()?)?,
        Commands::Languages { threshold } => {
            let threshold = threshold.unwrap_or(config.underrepresented_threshold);
            let stats = store.language_stats(threshold)?;
            report::write_languages(&mut out, &stats, threshold)?;
        }
        Commands::Wordcloud { max_words } => {
            let stopwords = match &config.stopwords_path {
                Some(path) => StopWords::builtin_with_file(path)?,
                None => StopWords::builtin(),
            };
            let options = WordCloudOptions {
                max_words: max_words.unwrap_or(config.wordcloud_max_words),
                min_token_len: config.wordcloud_min_token_len,
            };
            let cloud = store.word_cloud(
                &WordCloudGenerator::new(stopwords),
                CommentFilter::default(),
                options,
            )?;
            report::write_wordcloud(&mut out, &cloud)?;
        }
    }
    Ok(())
}
