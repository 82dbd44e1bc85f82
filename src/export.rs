use std::{
    fmt::Display,
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use flate2::{Compression, write::GzEncoder};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder};
use tracing::info;

use crate::{
    datasets::{Dataset, DatasetFilter, NULL_FIELD, PLACEHOLDER_NAME},
    entities::{aka, episode, person, principal, rating, title},
    error::AppResult,
};

/// Rows fetched per page while streaming a table out.
const EXPORT_PAGE: u64 = 10_000;

#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub export_dir: PathBuf,
    pub skip: DatasetFilter,
}

/// Write the database back out as gzipped TSV files in IMDb's layout.
pub async fn run_export(db: &DatabaseConnection, opts: &ExportOptions) -> AppResult<()> {
    std::fs::create_dir_all(&opts.export_dir)?;
    for dataset in Dataset::ALL {
        if opts.skip.skips(dataset) {
            info!(dataset = %dataset, "skipping dataset");
            continue;
        }
        export_file(db, dataset, &opts.export_dir).await?;
    }
    Ok(())
}

/// Export one dataset. Returns the number of rows written.
pub async fn export_file(db: &DatabaseConnection, dataset: Dataset, dir: &Path) -> AppResult<u64> {
    let path = dir.join(dataset.filename());
    info!(dataset = %dataset, path = %path.display(), "exporting dataset");

    let file = File::create(&path)?;
    let mut writer = BufWriter::new(GzEncoder::new(file, Compression::default()));
    writeln!(writer, "{}", dataset.columns().join("\t"))?;

    let exported = match dataset {
        Dataset::TitleBasics => export_titles(db, &mut writer).await?,
        Dataset::NameBasics => export_persons(db, &mut writer).await?,
        Dataset::TitleAkas => export_akas(db, &mut writer).await?,
        Dataset::TitlePrincipals => export_principals(db, &mut writer).await?,
        Dataset::TitleEpisode => export_episodes(db, &mut writer).await?,
        Dataset::TitleRatings => export_ratings(db, &mut writer).await?,
    };

    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.finish()?;
    info!(dataset = %dataset, rows = exported, "dataset export complete");
    Ok(exported)
}

fn opt_num<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| NULL_FIELD.to_string())
}

fn opt_text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NULL_FIELD)
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

async fn export_titles<W: Write>(db: &DatabaseConnection, writer: &mut W) -> AppResult<u64> {
    let mut pages = title::Entity::find()
        .order_by_asc(title::Column::TitleId)
        .paginate(db, EXPORT_PAGE);
    let mut exported = 0u64;
    while let Some(models) = pages.fetch_and_next().await? {
        for m in models {
            if m.primary_title == PLACEHOLDER_NAME {
                continue;
            }
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                m.title_id,
                m.title_type,
                m.primary_title,
                m.original_title,
                flag(m.is_adult),
                opt_num(m.premiered),
                opt_num(m.ended),
                opt_num(m.runtime_minutes),
                m.genres
            )?;
            exported += 1;
        }
    }
    Ok(exported)
}

async fn export_persons<W: Write>(db: &DatabaseConnection, writer: &mut W) -> AppResult<u64> {
    let mut pages = person::Entity::find()
        .order_by_asc(person::Column::PersonId)
        .paginate(db, EXPORT_PAGE);
    let mut exported = 0u64;
    while let Some(models) = pages.fetch_and_next().await? {
        for m in models {
            if m.name == PLACEHOLDER_NAME {
                continue;
            }
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}",
                m.person_id,
                m.name,
                opt_num(m.born),
                opt_num(m.died),
                m.primary_professions,
                m.known_for_titles
            )?;
            exported += 1;
        }
    }
    Ok(exported)
}

async fn export_akas<W: Write>(db: &DatabaseConnection, writer: &mut W) -> AppResult<u64> {
    let mut pages = aka::Entity::find()
        .order_by_asc(aka::Column::TitleId)
        .order_by_asc(aka::Column::Ordering)
        .paginate(db, EXPORT_PAGE);
    let mut exported = 0u64;
    while let Some(models) = pages.fetch_and_next().await? {
        for m in models {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                m.title_id,
                m.ordering,
                m.aka,
                opt_text(&m.region),
                opt_text(&m.language),
                opt_text(&m.aka_type),
                m.attributes,
                flag(m.is_original_title)
            )?;
            exported += 1;
        }
    }
    Ok(exported)
}

async fn export_principals<W: Write>(db: &DatabaseConnection, writer: &mut W) -> AppResult<u64> {
    let mut pages = principal::Entity::find()
        .order_by_asc(principal::Column::TitleId)
        .order_by_asc(principal::Column::Ordering)
        .paginate(db, EXPORT_PAGE);
    let mut exported = 0u64;
    while let Some(models) = pages.fetch_and_next().await? {
        for m in models {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}",
                m.title_id, m.ordering, m.person_id, m.category, m.job, m.characters
            )?;
            exported += 1;
        }
    }
    Ok(exported)
}

async fn export_episodes<W: Write>(db: &DatabaseConnection, writer: &mut W) -> AppResult<u64> {
    let mut pages = episode::Entity::find()
        .order_by_asc(episode::Column::EpisodeTitleId)
        .paginate(db, EXPORT_PAGE);
    let mut exported = 0u64;
    while let Some(models) = pages.fetch_and_next().await? {
        for m in models {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                m.episode_title_id,
                m.show_title_id,
                opt_num(m.season_number),
                opt_num(m.episode_number)
            )?;
            exported += 1;
        }
    }
    Ok(exported)
}

async fn export_ratings<W: Write>(db: &DatabaseConnection, writer: &mut W) -> AppResult<u64> {
    let mut pages = rating::Entity::find()
        .order_by_asc(rating::Column::TitleId)
        .paginate(db, EXPORT_PAGE);
    let mut exported = 0u64;
    while let Some(models) = pages.fetch_and_next().await? {
        for m in models {
            writeln!(writer, "{}\t{:.1}\t{}", m.title_id, m.rating, m.votes)?;
            exported += 1;
        }
    }
    Ok(exported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_values_encode_imdb_nulls() {
        assert_eq!(opt_num(Some(1999)), "1999");
        assert_eq!(opt_num::<i32>(None), "\\N");
        assert_eq!(opt_text(&Some("DE".to_string())), "DE");
        assert_eq!(opt_text(&None), "\\N");
        assert_eq!(flag(true), "1");
        assert_eq!(flag(false), "0");
    }
}
