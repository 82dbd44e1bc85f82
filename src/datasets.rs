use std::fmt;

/// The literal IMDb uses for "no value" in every dataset.
pub const NULL_FIELD: &str = "\\N";

/// Sentinel stored where a dataset row references a title or person the
/// basics files never delivered. Rows carrying it are skipped on export.
pub const PLACEHOLDER_NAME: &str = "__missing__";

/// The six dataset files, in import dependency order: referenced entities
/// (titles, persons) load before the datasets that point at them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dataset {
    TitleBasics,
    NameBasics,
    TitleAkas,
    TitlePrincipals,
    TitleEpisode,
    TitleRatings,
}

impl Dataset {
    pub const ALL: [Dataset; 6] = [
        Dataset::TitleBasics,
        Dataset::NameBasics,
        Dataset::TitleAkas,
        Dataset::TitlePrincipals,
        Dataset::TitleEpisode,
        Dataset::TitleRatings,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dataset::TitleBasics => "title.basics",
            Dataset::NameBasics => "name.basics",
            Dataset::TitleAkas => "title.akas",
            Dataset::TitlePrincipals => "title.principals",
            Dataset::TitleEpisode => "title.episode",
            Dataset::TitleRatings => "title.ratings",
        }
    }

    pub fn filename(self) -> &'static str {
        match self {
            Dataset::TitleBasics => "title.basics.tsv.gz",
            Dataset::NameBasics => "name.basics.tsv.gz",
            Dataset::TitleAkas => "title.akas.tsv.gz",
            Dataset::TitlePrincipals => "title.principals.tsv.gz",
            Dataset::TitleEpisode => "title.episode.tsv.gz",
            Dataset::TitleRatings => "title.ratings.tsv.gz",
        }
    }

    /// Column names as published by IMDb, in file order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Dataset::TitleBasics => &[
                "tconst",
                "titleType",
                "primaryTitle",
                "originalTitle",
                "isAdult",
                "startYear",
                "endYear",
                "runtimeMinutes",
                "genres",
            ],
            Dataset::NameBasics => &[
                "nconst",
                "primaryName",
                "birthYear",
                "deathYear",
                "primaryProfession",
                "knownForTitles",
            ],
            Dataset::TitleAkas => &[
                "titleId",
                "ordering",
                "title",
                "region",
                "language",
                "types",
                "attributes",
                "isOriginalTitle",
            ],
            Dataset::TitlePrincipals => {
                &["tconst", "ordering", "nconst", "category", "job", "characters"]
            },
            Dataset::TitleEpisode => &["tconst", "parentTconst", "seasonNumber", "episodeNumber"],
            Dataset::TitleRatings => &["tconst", "averageRating", "numVotes"],
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which datasets an import or export run should leave out.
#[derive(Clone, Copy, Debug, Default)]
pub struct DatasetFilter {
    pub title_basics: bool,
    pub name_basics: bool,
    pub title_akas: bool,
    pub title_principals: bool,
    pub title_episode: bool,
    pub title_ratings: bool,
}

impl DatasetFilter {
    pub fn skips(&self, dataset: Dataset) -> bool {
        match dataset {
            Dataset::TitleBasics => self.title_basics,
            Dataset::NameBasics => self.name_basics,
            Dataset::TitleAkas => self.title_akas,
            Dataset::TitlePrincipals => self.title_principals,
            Dataset::TitleEpisode => self.title_episode,
            Dataset::TitleRatings => self.title_ratings,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TsvError {
    #[error("{dataset}: missing header line")]
    MissingHeader { dataset: &'static str },
    #[error("{dataset}: header mismatch: expected {expected:?}, found {found:?}")]
    HeaderMismatch { dataset: &'static str, expected: &'static [&'static str], found: Vec<String> },
    #[error("{dataset} line {line}: expected {expected} tab-separated fields, found {found}")]
    FieldCount { dataset: &'static str, line: u64, expected: usize, found: usize },
    #[error("{dataset} line {line}: column {column} may not be empty")]
    MissingField { dataset: &'static str, line: u64, column: &'static str },
    #[error("{dataset} line {line}: column {column}: {value:?} is not a valid {kind}")]
    BadValue {
        dataset: &'static str,
        line: u64,
        column: &'static str,
        value: String,
        kind: &'static str,
    },
}

/// Check a file's header line against the published column layout. A layout
/// change upstream aborts the import instead of silently mis-mapping fields.
pub fn verify_header(dataset: Dataset, header: &str) -> Result<(), TsvError> {
    let found: Vec<String> = header.split('\t').map(|c| c.trim().to_string()).collect();
    if found != dataset.columns() {
        return Err(TsvError::HeaderMismatch {
            dataset: dataset.name(),
            expected: dataset.columns(),
            found,
        });
    }
    Ok(())
}

/// A parsed data line. `\N` and empty fields come back as None; typed
/// accessors carry the dataset, line and column through into errors.
pub struct Record<'a> {
    dataset: Dataset,
    line: u64,
    fields: Vec<Option<&'a str>>,
}

impl<'a> Record<'a> {
    pub fn parse(dataset: Dataset, line: u64, raw: &'a str) -> Result<Self, TsvError> {
        let expected = dataset.columns().len();
        let fields: Vec<Option<&str>> = raw
            .split('\t')
            .map(|field| {
                let field = field.trim();
                if field.is_empty() || field == NULL_FIELD { None } else { Some(field) }
            })
            .collect();
        if fields.len() != expected {
            return Err(TsvError::FieldCount {
                dataset: dataset.name(),
                line,
                expected,
                found: fields.len(),
            });
        }
        Ok(Self { dataset, line, fields })
    }

    fn column(&self, col: usize) -> &'static str {
        self.dataset.columns()[col]
    }

    fn bad_value(&self, col: usize, value: &str, kind: &'static str) -> TsvError {
        TsvError::BadValue {
            dataset: self.dataset.name(),
            line: self.line,
            column: self.column(col),
            value: value.to_string(),
            kind,
        }
    }

    /// Required identifier column.
    pub fn id(&self, col: usize) -> Result<String, TsvError> {
        self.fields[col].map(str::to_string).ok_or(TsvError::MissingField {
            dataset: self.dataset.name(),
            line: self.line,
            column: self.column(col),
        })
    }

    /// Text column where `\N` means the empty string.
    pub fn text(&self, col: usize) -> String {
        self.fields[col].map(str::to_string).unwrap_or_default()
    }

    pub fn opt_text(&self, col: usize) -> Option<String> {
        self.fields[col].map(str::to_string)
    }

    pub fn int(&self, col: usize) -> Result<i32, TsvError> {
        match self.opt_int(col)? {
            Some(value) => Ok(value),
            None => Err(TsvError::MissingField {
                dataset: self.dataset.name(),
                line: self.line,
                column: self.column(col),
            }),
        }
    }

    pub fn opt_int(&self, col: usize) -> Result<Option<i32>, TsvError> {
        match self.fields[col] {
            None => Ok(None),
            Some(raw) => {
                raw.parse().map(Some).map_err(|_| self.bad_value(col, raw, "integer"))
            },
        }
    }

    pub fn float(&self, col: usize) -> Result<f64, TsvError> {
        match self.fields[col] {
            None => Err(TsvError::MissingField {
                dataset: self.dataset.name(),
                line: self.line,
                column: self.column(col),
            }),
            Some(raw) => raw.parse().map_err(|_| self.bad_value(col, raw, "number")),
        }
    }

    /// Boolean column encoded as 0/1; `\N` reads as false.
    pub fn flag(&self, col: usize) -> Result<bool, TsvError> {
        match self.fields[col] {
            None | Some("0") => Ok(false),
            Some("1") => Ok(true),
            Some(raw) => Err(self.bad_value(col, raw, "boolean (0 or 1)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_null_sentinel_and_types() {
        let raw = "tt0133093\tmovie\tThe Matrix\tThe Matrix\t0\t1999\t\\N\t136\tAction,Sci-Fi";
        let rec = Record::parse(Dataset::TitleBasics, 2, raw).unwrap();
        assert_eq!(rec.id(0).unwrap(), "tt0133093");
        assert_eq!(rec.opt_text(1).as_deref(), Some("movie"));
        assert_eq!(rec.text(2), "The Matrix");
        assert!(!rec.flag(4).unwrap());
        assert_eq!(rec.opt_int(5).unwrap(), Some(1999));
        assert_eq!(rec.opt_int(6).unwrap(), None);
        assert_eq!(rec.opt_int(7).unwrap(), Some(136));
    }

    #[test]
    fn null_text_reads_as_empty() {
        let raw = "tt1\t1\tSome Title\t\\N\t\\N\t\\N\t\\N\t1";
        let rec = Record::parse(Dataset::TitleAkas, 3, raw).unwrap();
        assert_eq!(rec.opt_text(3), None);
        assert_eq!(rec.text(6), "");
        assert!(rec.flag(7).unwrap());
    }

    #[test]
    fn field_count_mismatch_is_an_error() {
        let err = Record::parse(Dataset::TitleRatings, 7, "tt1\t8.1").unwrap_err();
        match err {
            TsvError::FieldCount { line, expected, found, .. } => {
                assert_eq!(line, 7);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_flag_is_an_error() {
        let raw = "tt1\tmovie\tA\tA\tyes\t\\N\t\\N\t\\N\t\\N";
        let rec = Record::parse(Dataset::TitleBasics, 2, raw).unwrap();
        assert!(matches!(rec.flag(4), Err(TsvError::BadValue { .. })));
    }

    #[test]
    fn missing_required_id_is_an_error() {
        let rec = Record::parse(Dataset::TitleRatings, 2, "\\N\t8.1\t100").unwrap();
        assert!(matches!(rec.id(0), Err(TsvError::MissingField { .. })));
    }

    #[test]
    fn header_verification() {
        assert!(verify_header(Dataset::TitleRatings, "tconst\taverageRating\tnumVotes").is_ok());
        let err = verify_header(Dataset::TitleRatings, "tconst\trating\tvotes").unwrap_err();
        assert!(matches!(err, TsvError::HeaderMismatch { .. }));
    }

    #[test]
    fn skip_filter_matches_datasets() {
        let filter = DatasetFilter { title_akas: true, ..Default::default() };
        assert!(filter.skips(Dataset::TitleAkas));
        assert!(!filter.skips(Dataset::TitleBasics));
    }
}
