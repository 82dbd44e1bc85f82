use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use cinedex::{
    datasets::{Dataset, PLACEHOLDER_NAME},
    db,
    entities::{aka, episode, person, principal, rating, title, title_type},
    export, import, search,
};

const TITLES: &str = "tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres\n\
tt0071075\tmovie\tYoung Frankenstein\tYoung Frankenstein\t0\t1974\t\\N\t106\tComedy\n\
tt0106179\ttvSeries\tThe X-Files\tThe X-Files\t0\t1993\t2002\t45\tDrama,Mystery\n\
tt0133093\tmovie\tThe Matrix\tThe Matrix\t0\t1999\t\\N\t136\tAction,Sci-Fi\n";

const NAMES: &str = "nconst\tprimaryName\tbirthYear\tdeathYear\tprimaryProfession\tknownForTitles\n\
nm0000206\tKeanu Reeves\t1964\t\\N\tactor,producer\ttt0133093\n";

const AKAS: &str = "titleId\tordering\ttitle\tregion\tlanguage\ttypes\tattributes\tisOriginalTitle\n\
tt0071075\t1\tYoung Frankenstein\t\\N\t\\N\toriginal\t\\N\t1\n\
tt0133093\t1\tThe Matrix\t\\N\t\\N\toriginal\t\\N\t1\n\
tt0133093\t2\tMatrix\tDE\tde\timdbDisplay\t\\N\t0\n\
tt9999999\t1\tPhantom Feature\t\\N\t\\N\t\\N\t\\N\t0\n";

const PRINCIPALS: &str = "tconst\tordering\tnconst\tcategory\tjob\tcharacters\n\
tt0133093\t1\tnm0000206\tactor\t\\N\t[\"Neo\"]\n\
tt0133093\t2\tnm9999999\tdirector\t\\N\t\\N\n";

const EPISODES: &str = "tconst\tparentTconst\tseasonNumber\tepisodeNumber\n\
tt0106180\ttt0106179\t1\t1\n";

const RATINGS: &str = "tconst\taverageRating\tnumVotes\n\
tt0071075\t8.0\t180000\n\
tt0133093\t8.7\t2000000\n\
tt7777777\t6.5\t42\n";

fn write_gz(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
    path
}

fn read_gz(path: &Path) -> String {
    let mut out = String::new();
    GzDecoder::new(File::open(path).unwrap()).read_to_string(&mut out).unwrap();
    out
}

async fn test_db() -> DatabaseConnection {
    db::connect_and_migrate("sqlite::memory:").await.unwrap()
}

async fn import_fixtures(db: &DatabaseConnection, dir: &Path) {
    let files = [
        (Dataset::TitleBasics, TITLES),
        (Dataset::NameBasics, NAMES),
        (Dataset::TitleAkas, AKAS),
        (Dataset::TitlePrincipals, PRINCIPALS),
        (Dataset::TitleEpisode, EPISODES),
        (Dataset::TitleRatings, RATINGS),
    ];
    for (dataset, content) in files {
        let path = write_gz(dir, dataset.filename(), content);
        // deliberately tiny batches so the mid-stream flush path runs
        import::import_file(db, dataset, &path, 2).await.unwrap();
    }
}

#[tokio::test]
async fn imports_all_datasets_with_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db().await;
    import_fixtures(&db, dir.path()).await;

    // 3 real titles plus placeholders for tt9999999 (aka), tt0106180
    // (episode) and tt7777777 (rating)
    assert_eq!(title::Entity::find().count(&db).await.unwrap(), 6);
    assert_eq!(person::Entity::find().count(&db).await.unwrap(), 2);
    assert_eq!(aka::Entity::find().count(&db).await.unwrap(), 4);
    assert_eq!(principal::Entity::find().count(&db).await.unwrap(), 2);
    assert_eq!(episode::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(rating::Entity::find().count(&db).await.unwrap(), 3);

    let ghost = title::Entity::find_by_id("tt9999999").one(&db).await.unwrap().unwrap();
    assert_eq!(ghost.primary_title, PLACEHOLDER_NAME);
    assert_eq!(ghost.title_type, PLACEHOLDER_NAME);

    let ghost_director = person::Entity::find_by_id("nm9999999").one(&db).await.unwrap().unwrap();
    assert_eq!(ghost_director.name, PLACEHOLDER_NAME);

    // lookup tables populated on demand, placeholder type included
    let types: Vec<String> = title_type::Entity::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert!(types.contains(&"movie".to_string()));
    assert!(types.contains(&"tvSeries".to_string()));
    assert!(types.contains(&PLACEHOLDER_NAME.to_string()));
}

#[tokio::test]
async fn reimport_updates_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db().await;

    let path = write_gz(dir.path(), Dataset::TitleBasics.filename(), TITLES);
    import::import_file(&db, Dataset::TitleBasics, &path, 2).await.unwrap();
    assert_eq!(title::Entity::find().count(&db).await.unwrap(), 3);

    // a later drop changes the runtime; the row is updated, not duplicated
    let updated = TITLES.replace("\t136\t", "\t137\t");
    let path = write_gz(dir.path(), Dataset::TitleBasics.filename(), &updated);
    import::import_file(&db, Dataset::TitleBasics, &path, 2).await.unwrap();

    assert_eq!(title::Entity::find().count(&db).await.unwrap(), 3);
    let matrix = title::Entity::find_by_id("tt0133093").one(&db).await.unwrap().unwrap();
    assert_eq!(matrix.runtime_minutes, Some(137));

    let path = write_gz(dir.path(), Dataset::TitleAkas.filename(), AKAS);
    import::import_file(&db, Dataset::TitleAkas, &path, 2).await.unwrap();
    import::import_file(&db, Dataset::TitleAkas, &path, 2).await.unwrap();
    assert_eq!(aka::Entity::find().count(&db).await.unwrap(), 4);
}

#[tokio::test]
async fn header_only_file_imports_zero_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db().await;

    let path = write_gz(
        dir.path(),
        Dataset::TitleRatings.filename(),
        "tconst\taverageRating\tnumVotes\n",
    );
    let rows = import::import_file(&db, Dataset::TitleRatings, &path, 2).await.unwrap();
    assert_eq!(rows, 0);
    assert_eq!(rating::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn rejects_changed_column_layout() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db().await;

    let bad = "tconst\trating\tvotes\ntt0133093\t8.7\t2000000\n";
    let path = write_gz(dir.path(), Dataset::TitleRatings.filename(), bad);
    let err = import::import_file(&db, Dataset::TitleRatings, &path, 2).await.unwrap_err();
    assert!(err.to_string().contains("header mismatch"));
}

#[tokio::test]
async fn rejects_short_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db().await;

    let bad = "tconst\taverageRating\tnumVotes\ntt0133093\t8.7\n";
    let path = write_gz(dir.path(), Dataset::TitleRatings.filename(), bad);
    let err = import::import_file(&db, Dataset::TitleRatings, &path, 2).await.unwrap_err();
    assert!(err.to_string().contains("expected 3 tab-separated fields"));
}

#[tokio::test]
async fn search_finds_movies_by_aka() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db().await;
    import_fixtures(&db, dir.path()).await;

    // placeholder-typed tt9999999 is not a movie and stays out of the index
    let entries = search::reindex(&db, &["movie".to_string()]).await.unwrap();
    assert_eq!(entries, 3);

    // two akas for the same movie collapse to one hit
    let hits = search::search_titles(&db, "matrix", None, 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title_id, "tt0133093");
    assert_eq!(hits[0].premiered, Some(1999));
    assert_eq!(hits[0].votes, Some(2_000_000));

    let hits = search::search_titles(&db, "frankenstein", Some(1974), 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title_id, "tt0071075");

    let hits = search::search_titles(&db, "frankenstein", Some(1980), 10).await.unwrap();
    assert!(hits.is_empty());

    // tvSeries akas were not indexed
    let hits = search::search_titles(&db, "x-files", None, 10).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn reindex_replaces_previous_entries() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db().await;
    import_fixtures(&db, dir.path()).await;

    assert_eq!(search::reindex(&db, &["movie".to_string()]).await.unwrap(), 3);
    // a second rebuild must not double the index
    assert_eq!(search::reindex(&db, &["movie".to_string()]).await.unwrap(), 3);
    let hits = search::search_titles(&db, "matrix", None, 10).await.unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn export_round_trips_without_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db().await;
    import_fixtures(&db, dir.path()).await;

    let out = tempfile::tempdir().unwrap();
    let exported = export::export_file(&db, Dataset::TitleBasics, out.path()).await.unwrap();
    assert_eq!(exported, 3);

    let content = read_gz(&out.path().join(Dataset::TitleBasics.filename()));
    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres"
    );
    assert!(content.contains("tt0133093\tmovie\tThe Matrix\tThe Matrix\t0\t1999\t\\N\t136\tAction,Sci-Fi"));
    assert!(!content.contains("tt9999999"));

    // the exported file imports cleanly into a fresh database
    let db2 = test_db().await;
    let rows = import::import_file(
        &db2,
        Dataset::TitleBasics,
        &out.path().join(Dataset::TitleBasics.filename()),
        2,
    )
    .await
    .unwrap();
    assert_eq!(rows, 3);
    assert_eq!(title::Entity::find().count(&db2).await.unwrap(), 3);

    let ratings_out = export::export_file(&db, Dataset::TitleRatings, out.path()).await.unwrap();
    assert_eq!(ratings_out, 3);
    let content = read_gz(&out.path().join(Dataset::TitleRatings.filename()));
    assert!(content.contains("tt0071075\t8.0\t180000"));
}
