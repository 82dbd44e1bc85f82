use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::datasets::DatasetFilter;

#[derive(Debug, Parser)]
#[command(
    name = "cinedex",
    about = "Mirror IMDb's public non-commercial TSV datasets into SQLite and search titles",
    version
)]
pub struct Cli {
    /// Override the database URL (defaults to DATABASE_URL or a local file)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the IMDb TSV datasets and load them into the database
    Import(ImportArgs),
    /// Write the database back out as gzipped TSV files
    Export(ExportArgs),
    /// Rebuild the full-text title search index
    Reindex(ReindexArgs),
    /// Search the title index
    Search(SearchArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Directory where downloaded TSV files are cached
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Base URL the dataset files are fetched from
    #[arg(long)]
    pub base_url: Option<String>,

    /// Re-download a cached dataset file once it is older than this
    #[arg(long)]
    pub max_age_hours: Option<i64>,

    /// Rows accumulated in memory before a bulk upsert
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Leave the search index alone after importing
    #[arg(long)]
    pub no_reindex: bool,

    #[command(flatten)]
    pub skip: SkipArgs,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Directory the TSV files are written to
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    #[command(flatten)]
    pub skip: SkipArgs,
}

#[derive(Debug, Args)]
pub struct ReindexArgs {
    /// Title types to index (repeatable)
    #[arg(long = "title-type", default_values_t = vec!["movie".to_string()])]
    pub title_types: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// The title to search for
    pub query: String,

    /// Only match titles premiered in this year
    #[arg(long)]
    pub year: Option<i32>,

    /// Maximum number of results
    #[arg(long, default_value_t = 20)]
    pub limit: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct SkipArgs {
    /// Skip title.basics.tsv.gz
    #[arg(long)]
    pub skip_title_basics: bool,

    /// Skip name.basics.tsv.gz
    #[arg(long)]
    pub skip_name_basics: bool,

    /// Skip title.akas.tsv.gz
    #[arg(long)]
    pub skip_title_akas: bool,

    /// Skip title.principals.tsv.gz
    #[arg(long)]
    pub skip_title_principals: bool,

    /// Skip title.episode.tsv.gz
    #[arg(long)]
    pub skip_title_episode: bool,

    /// Skip title.ratings.tsv.gz
    #[arg(long)]
    pub skip_title_ratings: bool,
}

impl SkipArgs {
    pub fn filter(&self) -> DatasetFilter {
        DatasetFilter {
            title_basics: self.skip_title_basics,
            name_basics: self.skip_name_basics,
            title_akas: self.skip_title_akas,
            title_principals: self.skip_title_principals,
            title_episode: self.skip_title_episode,
            title_ratings: self.skip_title_ratings,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parses_import_flags() {
        let cli = Cli::parse_from([
            "cinedex",
            "import",
            "--download-dir",
            "/tmp/data",
            "--skip-title-principals",
            "--no-reindex",
        ]);
        match cli.command {
            Command::Import(args) => {
                assert_eq!(args.download_dir.as_deref(), Some(std::path::Path::new("/tmp/data")));
                assert!(args.no_reindex);
                let filter = args.skip.filter();
                assert!(filter.title_principals);
                assert!(!filter.title_basics);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn search_defaults() {
        let cli = Cli::parse_from(["cinedex", "search", "the matrix", "--year", "1999"]);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query, "the matrix");
                assert_eq!(args.year, Some(1999));
                assert_eq!(args.limit, 20);
                assert!(!args.json);
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn reindex_defaults_to_movies() {
        let cli = Cli::parse_from(["cinedex", "reindex"]);
        match cli.command {
            Command::Reindex(args) => assert_eq!(args.title_types, vec!["movie".to_string()]),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
