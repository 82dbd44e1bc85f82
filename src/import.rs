use std::{
    collections::HashSet,
    fs::File,
    io::{BufRead, BufReader, Lines, Read},
    path::Path,
    time::Instant,
};

use flate2::read::GzDecoder;
use sea_orm::{
    DatabaseConnection, EntityTrait, NotSet, Set, TransactionTrait, sea_query::OnConflict,
};
use tracing::{debug, info};

use crate::{
    datasets::{Dataset, DatasetFilter, PLACEHOLDER_NAME, Record, TsvError, verify_header},
    entities::{
        aka, aka_language, aka_region, aka_type, crew_category, episode, person, principal,
        rating, title, title_type,
    },
    error::AppResult,
    fetch::{self, FetchOptions},
    search,
};

/// Rows per INSERT statement. Bounded well below SQLite's bind parameter
/// limit even for the widest table.
const INSERT_CHUNK: usize = 1000;

#[derive(Clone, Debug)]
pub struct ImportOptions {
    pub fetch: FetchOptions,
    pub batch_size: usize,
    pub skip: DatasetFilter,
    pub reindex: bool,
}

/// Download whatever is stale, load all six datasets in dependency order,
/// then rebuild the title search index.
pub async fn run_import(
    db: &DatabaseConnection,
    http: &reqwest::Client,
    opts: &ImportOptions,
) -> AppResult<()> {
    for dataset in Dataset::ALL {
        if opts.skip.skips(dataset) {
            info!(dataset = %dataset, "skipping dataset");
            continue;
        }
        let path = fetch::ensure_dataset(http, &opts.fetch, dataset).await?;
        import_file(db, dataset, &path, opts.batch_size).await?;
    }

    if opts.reindex {
        let entries = search::reindex(db, &["movie".to_string()]).await?;
        info!(entries = entries, "search index rebuilt");
    }
    Ok(())
}

/// Import a single local dataset file. Returns the number of rows loaded.
pub async fn import_file(
    db: &DatabaseConnection,
    dataset: Dataset,
    path: &Path,
    batch_size: usize,
) -> AppResult<u64> {
    let total = count_rows(path)?;
    info!(dataset = %dataset, path = %path.display(), rows = total, "importing dataset");

    let reader = BufReader::with_capacity(1 << 20, GzDecoder::new(File::open(path)?));
    let started = Instant::now();
    let imported = match dataset {
        Dataset::TitleBasics => import_titles(db, reader, batch_size, total).await?,
        Dataset::NameBasics => import_persons(db, reader, batch_size, total).await?,
        Dataset::TitleAkas => import_akas(db, reader, batch_size, total).await?,
        Dataset::TitlePrincipals => import_principals(db, reader, batch_size, total).await?,
        Dataset::TitleEpisode => import_episodes(db, reader, batch_size, total).await?,
        Dataset::TitleRatings => import_ratings(db, reader, batch_size, total).await?,
    };

    let elapsed = started.elapsed().as_secs_f64();
    info!(
        dataset = %dataset,
        rows = imported,
        elapsed_secs = format!("{elapsed:.1}"),
        rows_per_sec = (imported as f64 / elapsed.max(0.001)) as u64,
        "dataset import complete"
    );
    Ok(imported)
}

/// Count data rows by streaming the gzip once, so progress can be reported
/// as a percentage. The header line is not a data row.
fn count_rows(path: &Path) -> AppResult<u64> {
    let mut reader = GzDecoder::new(File::open(path)?);
    let mut buf = vec![0u8; 1 << 20];
    let mut lines = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        lines += buf[..n].iter().filter(|&&b| b == b'\n').count() as u64;
    }
    Ok(lines.saturating_sub(1))
}

fn read_header<R: BufRead>(lines: &mut Lines<R>, dataset: Dataset) -> AppResult<()> {
    let header = lines.next().ok_or(TsvError::MissingHeader { dataset: dataset.name() })??;
    verify_header(dataset, &header)?;
    Ok(())
}

struct Progress {
    dataset: Dataset,
    total: u64,
    done: u64,
    started: Instant,
}

impl Progress {
    fn new(dataset: Dataset, total: u64) -> Self {
        Self { dataset, total, done: 0, started: Instant::now() }
    }

    fn flushed(&mut self, rows: u64) {
        self.done += rows;
        let percent = if self.total > 0 { self.done * 100 / self.total } else { 100 };
        let rate = self.done as f64 / self.started.elapsed().as_secs_f64().max(0.001);
        info!(
            dataset = %self.dataset,
            rows = self.done,
            total = self.total,
            percent = percent,
            rows_per_sec = rate as u64,
            "import progress"
        );
    }
}

// Bulk upsert: chunked multi-row INSERT ... ON CONFLICT ... DO UPDATE
// inside one transaction per flush. Clears the batch for reuse.
macro_rules! bulk_upsert {
    ($name:ident, $entity:ident, [$($conflict:ident),+], [$($update:ident),+]) => {
        async fn $name(
            db: &DatabaseConnection,
            batch: &mut Vec<$entity::ActiveModel>,
        ) -> AppResult<()> {
            if batch.is_empty() {
                return Ok(());
            }
            let txn = db.begin().await?;
            for chunk in batch.chunks(INSERT_CHUNK) {
                $entity::Entity::insert_many(chunk.to_vec())
                    .on_conflict(
                        OnConflict::columns([$($entity::Column::$conflict),+])
                            .update_columns([$($entity::Column::$update),+])
                            .to_owned(),
                    )
                    .exec_without_returning(&txn)
                    .await?;
            }
            txn.commit().await?;
            debug!(rows = batch.len(), table = stringify!($entity), "flushed batch");
            batch.clear();
            Ok(())
        }
    };
}

bulk_upsert!(flush_titles, title, [TitleId], [
    TitleType,
    PrimaryTitle,
    OriginalTitle,
    IsAdult,
    Premiered,
    Ended,
    RuntimeMinutes,
    Genres
]);
bulk_upsert!(flush_persons, person, [PersonId], [
    Name,
    Born,
    Died,
    PrimaryProfessions,
    KnownForTitles
]);
bulk_upsert!(flush_akas, aka, [TitleId, Ordering], [
    Aka,
    Region,
    Language,
    AkaType,
    Attributes,
    IsOriginalTitle
]);
bulk_upsert!(flush_principals, principal, [TitleId, Ordering], [
    PersonId,
    Category,
    Job,
    Characters
]);
bulk_upsert!(flush_episodes, episode, [EpisodeTitleId], [
    ShowTitleId,
    SeasonNumber,
    EpisodeNumber
]);
bulk_upsert!(flush_ratings, rating, [TitleId], [Rating, Votes]);

// Lookup tables are tiny and populated on first sight of each value.
macro_rules! ensure_name_row {
    ($name:ident, $entity:ident) => {
        async fn $name(
            db: &DatabaseConnection,
            seen: &mut HashSet<String>,
            value: &str,
        ) -> AppResult<()> {
            if seen.contains(value) {
                return Ok(());
            }
            $entity::Entity::insert($entity::ActiveModel { name: Set(value.to_string()) })
                .on_conflict(OnConflict::column($entity::Column::Name).do_nothing().to_owned())
                .exec_without_returning(db)
                .await?;
            seen.insert(value.to_string());
            Ok(())
        }
    };
}

ensure_name_row!(ensure_title_type, title_type);
ensure_name_row!(ensure_aka_type, aka_type);
ensure_name_row!(ensure_aka_region, aka_region);
ensure_name_row!(ensure_aka_language, aka_language);
ensure_name_row!(ensure_crew_category, crew_category);

/// Make sure every referenced title exists before a child batch is flushed.
/// IMDb's child datasets reference tconst values the basics file never
/// delivered; those become placeholder rows, which a later real row may
/// overwrite via the normal upsert path.
async fn ensure_titles(
    db: &DatabaseConnection,
    seen: &mut HashSet<String>,
    ids: &[String],
) -> AppResult<()> {
    let mut placeholders = Vec::new();
    for id in ids {
        if seen.insert(id.clone()) {
            placeholders.push(title::ActiveModel {
                title_id: Set(id.clone()),
                title_type: Set(PLACEHOLDER_NAME.to_string()),
                primary_title: Set(PLACEHOLDER_NAME.to_string()),
                original_title: Set(PLACEHOLDER_NAME.to_string()),
                is_adult: Set(false),
                premiered: Set(None),
                ended: Set(None),
                runtime_minutes: Set(None),
                genres: Set(String::new()),
            });
        }
    }
    if placeholders.is_empty() {
        return Ok(());
    }
    // Placeholder titles point at a placeholder type row.
    title_type::Entity::insert(title_type::ActiveModel { name: Set(PLACEHOLDER_NAME.to_string()) })
        .on_conflict(OnConflict::column(title_type::Column::Name).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    for chunk in placeholders.chunks(INSERT_CHUNK) {
        title::Entity::insert_many(chunk.to_vec())
            .on_conflict(OnConflict::column(title::Column::TitleId).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

async fn ensure_persons(
    db: &DatabaseConnection,
    seen: &mut HashSet<String>,
    ids: &[String],
) -> AppResult<()> {
    let mut placeholders = Vec::new();
    for id in ids {
        if seen.insert(id.clone()) {
            placeholders.push(person::ActiveModel {
                person_id: Set(id.clone()),
                name: Set(PLACEHOLDER_NAME.to_string()),
                born: Set(None),
                died: Set(None),
                primary_professions: Set(String::new()),
                known_for_titles: Set(String::new()),
            });
        }
    }
    for chunk in placeholders.chunks(INSERT_CHUNK) {
        person::Entity::insert_many(chunk.to_vec())
            .on_conflict(OnConflict::column(person::Column::PersonId).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}

async fn import_titles<R: BufRead>(
    db: &DatabaseConnection,
    reader: R,
    batch_size: usize,
    total: u64,
) -> AppResult<u64> {
    let dataset = Dataset::TitleBasics;
    let mut lines = reader.lines();
    read_header(&mut lines, dataset)?;

    let mut seen_types = HashSet::new();
    let mut batch = Vec::with_capacity(batch_size);
    let mut progress = Progress::new(dataset, total);
    let mut line_no = 1u64;

    for line in lines {
        let line = line?;
        line_no += 1;
        if line.is_empty() {
            continue;
        }
        let rec = Record::parse(dataset, line_no, &line)?;
        let title_type =
            rec.opt_text(1).unwrap_or_else(|| PLACEHOLDER_NAME.to_string());
        ensure_title_type(db, &mut seen_types, &title_type).await?;
        batch.push(title::ActiveModel {
            title_id: Set(rec.id(0)?),
            title_type: Set(title_type),
            primary_title: Set(rec.text(2)),
            original_title: Set(rec.text(3)),
            is_adult: Set(rec.flag(4)?),
            premiered: Set(rec.opt_int(5)?),
            ended: Set(rec.opt_int(6)?),
            runtime_minutes: Set(rec.opt_int(7)?),
            genres: Set(rec.text(8)),
        });
        if batch.len() >= batch_size {
            let rows = batch.len() as u64;
            flush_titles(db, &mut batch).await?;
            progress.flushed(rows);
        }
    }
    let rows = batch.len() as u64;
    flush_titles(db, &mut batch).await?;
    if rows > 0 {
        progress.flushed(rows);
    }
    Ok(progress.done)
}

async fn import_persons<R: BufRead>(
    db: &DatabaseConnection,
    reader: R,
    batch_size: usize,
    total: u64,
) -> AppResult<u64> {
    let dataset = Dataset::NameBasics;
    let mut lines = reader.lines();
    read_header(&mut lines, dataset)?;

    let mut batch = Vec::with_capacity(batch_size);
    let mut progress = Progress::new(dataset, total);
    let mut line_no = 1u64;

    for line in lines {
        let line = line?;
        line_no += 1;
        if line.is_empty() {
            continue;
        }
        let rec = Record::parse(dataset, line_no, &line)?;
        batch.push(person::ActiveModel {
            person_id: Set(rec.id(0)?),
            name: Set(rec.text(1)),
            born: Set(rec.opt_int(2)?),
            died: Set(rec.opt_int(3)?),
            primary_professions: Set(rec.text(4)),
            known_for_titles: Set(rec.text(5)),
        });
        if batch.len() >= batch_size {
            let rows = batch.len() as u64;
            flush_persons(db, &mut batch).await?;
            progress.flushed(rows);
        }
    }
    let rows = batch.len() as u64;
    flush_persons(db, &mut batch).await?;
    if rows > 0 {
        progress.flushed(rows);
    }
    Ok(progress.done)
}

async fn import_akas<R: BufRead>(
    db: &DatabaseConnection,
    reader: R,
    batch_size: usize,
    total: u64,
) -> AppResult<u64> {
    let dataset = Dataset::TitleAkas;
    let mut lines = reader.lines();
    read_header(&mut lines, dataset)?;

    let mut seen_titles = HashSet::new();
    let mut seen_types = HashSet::new();
    let mut seen_regions = HashSet::new();
    let mut seen_languages = HashSet::new();
    let mut pending_titles = Vec::new();
    let mut batch = Vec::with_capacity(batch_size);
    let mut progress = Progress::new(dataset, total);
    let mut line_no = 1u64;

    for line in lines {
        let line = line?;
        line_no += 1;
        if line.is_empty() {
            continue;
        }
        let rec = Record::parse(dataset, line_no, &line)?;
        let title_id = rec.id(0)?;

        let region = rec.opt_text(3);
        if let Some(region) = &region {
            ensure_aka_region(db, &mut seen_regions, region).await?;
        }
        let language = rec.opt_text(4);
        if let Some(language) = &language {
            ensure_aka_language(db, &mut seen_languages, language).await?;
        }
        let aka_type = rec.opt_text(5);
        if let Some(aka_type) = &aka_type {
            ensure_aka_type(db, &mut seen_types, aka_type).await?;
        }

        pending_titles.push(title_id.clone());
        batch.push(aka::ActiveModel {
            id: NotSet,
            title_id: Set(title_id),
            ordering: Set(rec.int(1)?),
            aka: Set(rec.text(2)),
            region: Set(region),
            language: Set(language),
            aka_type: Set(aka_type),
            attributes: Set(rec.text(6)),
            is_original_title: Set(rec.flag(7)?),
        });
        if batch.len() >= batch_size {
            ensure_titles(db, &mut seen_titles, &pending_titles).await?;
            pending_titles.clear();
            let rows = batch.len() as u64;
            flush_akas(db, &mut batch).await?;
            progress.flushed(rows);
        }
    }
    ensure_titles(db, &mut seen_titles, &pending_titles).await?;
    let rows = batch.len() as u64;
    flush_akas(db, &mut batch).await?;
    if rows > 0 {
        progress.flushed(rows);
    }
    Ok(progress.done)
}

async fn import_principals<R: BufRead>(
    db: &DatabaseConnection,
    reader: R,
    batch_size: usize,
    total: u64,
) -> AppResult<u64> {
    let dataset = Dataset::TitlePrincipals;
    let mut lines = reader.lines();
    read_header(&mut lines, dataset)?;

    let mut seen_titles = HashSet::new();
    let mut seen_persons = HashSet::new();
    let mut seen_categories = HashSet::new();
    let mut pending_titles = Vec::new();
    let mut pending_persons = Vec::new();
    let mut batch = Vec::with_capacity(batch_size);
    let mut progress = Progress::new(dataset, total);
    let mut line_no = 1u64;

    for line in lines {
        let line = line?;
        line_no += 1;
        if line.is_empty() {
            continue;
        }
        let rec = Record::parse(dataset, line_no, &line)?;
        let title_id = rec.id(0)?;
        let person_id = rec.id(2)?;
        let category = rec.id(3)?;
        ensure_crew_category(db, &mut seen_categories, &category).await?;

        pending_titles.push(title_id.clone());
        pending_persons.push(person_id.clone());
        batch.push(principal::ActiveModel {
            id: NotSet,
            title_id: Set(title_id),
            ordering: Set(rec.int(1)?),
            person_id: Set(person_id),
            category: Set(category),
            job: Set(rec.text(4)),
            characters: Set(rec.text(5)),
        });
        if batch.len() >= batch_size {
            ensure_titles(db, &mut seen_titles, &pending_titles).await?;
            ensure_persons(db, &mut seen_persons, &pending_persons).await?;
            pending_titles.clear();
            pending_persons.clear();
            let rows = batch.len() as u64;
            flush_principals(db, &mut batch).await?;
            progress.flushed(rows);
        }
    }
    ensure_titles(db, &mut seen_titles, &pending_titles).await?;
    ensure_persons(db, &mut seen_persons, &pending_persons).await?;
    let rows = batch.len() as u64;
    flush_principals(db, &mut batch).await?;
    if rows > 0 {
        progress.flushed(rows);
    }
    Ok(progress.done)
}

async fn import_episodes<R: BufRead>(
    db: &DatabaseConnection,
    reader: R,
    batch_size: usize,
    total: u64,
) -> AppResult<u64> {
    let dataset = Dataset::TitleEpisode;
    let mut lines = reader.lines();
    read_header(&mut lines, dataset)?;

    let mut seen_titles = HashSet::new();
    let mut pending_titles = Vec::new();
    let mut batch = Vec::with_capacity(batch_size);
    let mut progress = Progress::new(dataset, total);
    let mut line_no = 1u64;

    for line in lines {
        let line = line?;
        line_no += 1;
        if line.is_empty() {
            continue;
        }
        let rec = Record::parse(dataset, line_no, &line)?;
        let episode_title_id = rec.id(0)?;
        let show_title_id = rec.id(1)?;

        pending_titles.push(episode_title_id.clone());
        pending_titles.push(show_title_id.clone());
        batch.push(episode::ActiveModel {
            id: NotSet,
            show_title_id: Set(show_title_id),
            episode_title_id: Set(episode_title_id),
            season_number: Set(rec.opt_int(2)?),
            episode_number: Set(rec.opt_int(3)?),
        });
        if batch.len() >= batch_size {
            ensure_titles(db, &mut seen_titles, &pending_titles).await?;
            pending_titles.clear();
            let rows = batch.len() as u64;
            flush_episodes(db, &mut batch).await?;
            progress.flushed(rows);
        }
    }
    ensure_titles(db, &mut seen_titles, &pending_titles).await?;
    let rows = batch.len() as u64;
    flush_episodes(db, &mut batch).await?;
    if rows > 0 {
        progress.flushed(rows);
    }
    Ok(progress.done)
}

async fn import_ratings<R: BufRead>(
    db: &DatabaseConnection,
    reader: R,
    batch_size: usize,
    total: u64,
) -> AppResult<u64> {
    let dataset = Dataset::TitleRatings;
    let mut lines = reader.lines();
    read_header(&mut lines, dataset)?;

    let mut seen_titles = HashSet::new();
    let mut pending_titles = Vec::new();
    let mut batch = Vec::with_capacity(batch_size);
    let mut progress = Progress::new(dataset, total);
    let mut line_no = 1u64;

    for line in lines {
        let line = line?;
        line_no += 1;
        if line.is_empty() {
            continue;
        }
        let rec = Record::parse(dataset, line_no, &line)?;
        let title_id = rec.id(0)?;

        pending_titles.push(title_id.clone());
        batch.push(rating::ActiveModel {
            title_id: Set(title_id),
            rating: Set(rec.float(1)?),
            votes: Set(rec.int(2)?),
        });
        if batch.len() >= batch_size {
            ensure_titles(db, &mut seen_titles, &pending_titles).await?;
            pending_titles.clear();
            let rows = batch.len() as u64;
            flush_ratings(db, &mut batch).await?;
            progress.flushed(rows);
        }
    }
    ensure_titles(db, &mut seen_titles, &pending_titles).await?;
    let rows = batch.len() as u64;
    flush_ratings(db, &mut batch).await?;
    if rows > 0 {
        progress.flushed(rows);
    }
    Ok(progress.done)
}
