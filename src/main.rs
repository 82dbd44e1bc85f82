use std::time::Duration;

use clap::Parser;

use cinedex::{
    cli::{Cli, Command},
    config::Config,
    db,
    export::{self, ExportOptions},
    fetch::FetchOptions,
    import::{self, ImportOptions},
    search::{self, SearchHit},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,cinedex=debug,sqlx=warn".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let database_url = cli.database_url.unwrap_or_else(|| config.database_url.clone());
    let db = db::connect_and_migrate(&database_url).await?;

    match cli.command {
        Command::Import(args) => {
            let http = reqwest::Client::builder()
                .user_agent(concat!("cinedex/", env!("CARGO_PKG_VERSION")))
                .connect_timeout(Duration::from_secs(30))
                .build()?;
            let opts = ImportOptions {
                fetch: FetchOptions {
                    base_url: args.base_url.unwrap_or(config.base_url),
                    download_dir: args.download_dir.unwrap_or(config.download_dir),
                    max_age_hours: args.max_age_hours.unwrap_or(config.max_age_hours),
                },
                batch_size: args.batch_size.unwrap_or(config.batch_size),
                skip: args.skip.filter(),
                reindex: !args.no_reindex,
            };
            import::run_import(&db, &http, &opts).await?;
        },
        Command::Export(args) => {
            let opts = ExportOptions {
                export_dir: args.export_dir.unwrap_or(config.export_dir),
                skip: args.skip.filter(),
            };
            export::run_export(&db, &opts).await?;
        },
        Command::Reindex(args) => {
            let entries = search::reindex(&db, &args.title_types).await?;
            tracing::info!(entries = entries, "search index rebuilt");
        },
        Command::Search(args) => {
            let hits = search::search_titles(&db, &args.query, args.year, args.limit).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("no matches");
            } else {
                for hit in &hits {
                    println!("{}", format_hit(hit));
                }
            }
        },
    }

    Ok(())
}

fn format_hit(hit: &SearchHit) -> String {
    let year = match (hit.premiered, hit.ended) {
        (Some(premiered), Some(ended)) => format!(" ({premiered}-{ended})"),
        (Some(premiered), None) => format!(" ({premiered})"),
        _ => String::new(),
    };
    let rating = match (hit.rating, hit.votes) {
        (Some(rating), Some(votes)) => format!("  {rating:.1} from {votes} votes"),
        _ => String::new(),
    };
    format!("{}  {}{year}{rating}", hit.title_id, hit.title)
}
