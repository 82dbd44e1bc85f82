use sea_orm::{ConnectionTrait, DatabaseConnection, Statement, Value};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::AppResult;

/// Characters dropped before indexing and before querying. They are not
/// token separators, so "Amelie's" should match a query for "amelies".
const IGNORED_CHARS: [char; 4] = ['\'', '(', ')', '.'];

/// Source rows pulled per page while rebuilding the index.
const REINDEX_PAGE: i64 = 50_000;

/// Entries per INSERT into the FTS table (7 bind params each).
const INDEX_INSERT_CHUNK: usize = 2000;

#[derive(Clone, Debug, Serialize)]
pub struct SearchHit {
    pub title_id: String,
    pub title: String,
    pub premiered: Option<i32>,
    pub ended: Option<i32>,
    pub rating: Option<f64>,
    pub votes: Option<i32>,
}

struct IndexEntry {
    title_id: String,
    title: String,
    premiered: Option<i32>,
    ended: Option<i32>,
    rating: Option<f64>,
    votes: Option<i32>,
}

pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| !IGNORED_CHARS.contains(c)).collect()
}

/// Turn a user query into an FTS5 MATCH expression: normalize, then quote
/// each token so MATCH syntax characters in the input cannot inject
/// operators. None when nothing indexable remains.
pub fn match_expr(query: &str) -> Option<String> {
    let normalized = normalize(query);
    let tokens: Vec<String> = normalized
        .split_whitespace()
        .map(|token| format!("\"{}\"", token.replace('"', "\"\"")))
        .collect();
    if tokens.is_empty() { None } else { Some(tokens.join(" ")) }
}

/// Rebuild the title search index from scratch: every distinct aka of a
/// title whose type is in `title_types`, joined with its rating.
pub async fn reindex(db: &DatabaseConnection, title_types: &[String]) -> AppResult<u64> {
    if title_types.is_empty() {
        return Ok(0);
    }
    let type_params = vec!["?"; title_types.len()].join(", ");

    let count_sql = format!(
        "SELECT COUNT(*) AS total FROM (SELECT DISTINCT a.title_id, a.aka FROM aka AS a \
         INNER JOIN title AS t ON t.title_id = a.title_id \
         WHERE t.title_type IN ({type_params}))"
    );
    let row = db
        .query_one(Statement::from_sql_and_values(
            db.get_database_backend(),
            count_sql,
            title_types.iter().map(|t| Value::from(t.as_str())),
        ))
        .await?;
    let total: i64 = row.map(|r| r.try_get("", "total")).transpose()?.unwrap_or(0);
    info!(entries = total, types = ?title_types, "rebuilding title search index");

    db.execute_unprepared("DELETE FROM title_search").await?;

    let select_sql = format!(
        "SELECT DISTINCT a.title_id, a.aka, t.premiered, t.ended, r.rating, r.votes \
         FROM aka AS a \
         INNER JOIN title AS t ON t.title_id = a.title_id \
         LEFT JOIN rating AS r ON r.title_id = a.title_id \
         WHERE t.title_type IN ({type_params}) \
         ORDER BY a.title_id, a.aka LIMIT ? OFFSET ?"
    );

    let mut indexed = 0u64;
    let mut offset = 0i64;
    loop {
        let values: Vec<Value> = title_types
            .iter()
            .map(|t| Value::from(t.as_str()))
            .chain([Value::from(REINDEX_PAGE), Value::from(offset)])
            .collect();
        let rows = db
            .query_all(Statement::from_sql_and_values(
                db.get_database_backend(),
                select_sql.clone(),
                values,
            ))
            .await?;
        if rows.is_empty() {
            break;
        }

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            entries.push(IndexEntry {
                title_id: row.try_get("", "title_id")?,
                title: row.try_get("", "aka")?,
                premiered: row.try_get("", "premiered")?,
                ended: row.try_get("", "ended")?,
                rating: row.try_get("", "rating")?,
                votes: row.try_get("", "votes")?,
            });
        }
        for chunk in entries.chunks(INDEX_INSERT_CHUNK) {
            insert_entries(db, chunk).await?;
        }

        indexed += rows.len() as u64;
        offset += rows.len() as i64;
        info!(indexed = indexed, total = total, "reindex progress");
    }
    Ok(indexed)
}

async fn insert_entries(db: &DatabaseConnection, entries: &[IndexEntry]) -> AppResult<()> {
    let mut sql = String::from(
        "INSERT INTO title_search (title, search_id, title_id, premiered, ended, rating, votes) \
         VALUES ",
    );
    sql.push_str(&vec!["(?, ?, ?, ?, ?, ?, ?)"; entries.len()].join(", "));

    let mut values: Vec<Value> = Vec::with_capacity(entries.len() * 7);
    for entry in entries {
        values.push(normalize(&entry.title).into());
        values.push(format!("{}-{}", entry.title_id, entry.title).into());
        values.push(entry.title_id.as_str().into());
        values.push(entry.premiered.into());
        values.push(entry.ended.into());
        values.push(entry.rating.into());
        values.push(entry.votes.into());
    }
    db.execute(Statement::from_sql_and_values(db.get_database_backend(), sql, values)).await?;
    Ok(())
}

/// Full-text title search. Results are unique per title, best FTS5 rank
/// first, vote count breaking ties.
pub async fn search_titles(
    db: &DatabaseConnection,
    query: &str,
    year: Option<i32>,
    limit: u64,
) -> AppResult<Vec<SearchHit>> {
    let Some(expr) = match_expr(query) else {
        debug!(query = %query, "query normalized to nothing, skipping search");
        return Ok(Vec::new());
    };

    let mut sql = String::from(
        "SELECT title_id, title, premiered, ended, rating, votes, MIN(rank) AS best_rank \
         FROM title_search WHERE title_search MATCH ?",
    );
    let mut values: Vec<Value> = vec![expr.into()];
    if let Some(year) = year {
        sql.push_str(" AND premiered = ?");
        values.push(year.into());
    }
    sql.push_str(" GROUP BY title_id ORDER BY best_rank, votes DESC LIMIT ?");
    values.push(Value::from(limit as i64));

    let rows = db
        .query_all(Statement::from_sql_and_values(db.get_database_backend(), sql, values))
        .await?;

    let mut hits = Vec::with_capacity(rows.len());
    for row in &rows {
        hits.push(SearchHit {
            title_id: row.try_get("", "title_id")?,
            title: row.try_get("", "title")?,
            premiered: row.try_get("", "premiered")?,
            ended: row.try_get("", "ended")?,
            rating: row.try_get("", "rating")?,
            votes: row.try_get("", "votes")?,
        });
    }
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_ignored_chars() {
        assert_eq!(normalize("Amelie's Adventure (2001)"), "Amelies Adventure 2001");
        assert_eq!(normalize("M.A.S.H."), "MASH");
    }

    #[test]
    fn match_expr_quotes_tokens() {
        assert_eq!(match_expr("the matrix"), Some("\"the\" \"matrix\"".to_string()));
        assert_eq!(match_expr("O.K."), Some("\"OK\"".to_string()));
        assert_eq!(match_expr("a \"b\""), Some("\"a\" \"\"\"b\"\"\"".to_string()));
    }

    #[test]
    fn match_expr_empty_after_normalizing() {
        assert_eq!(match_expr(""), None);
        assert_eq!(match_expr("().."), None);
        assert_eq!(match_expr("   "), None);
    }
}
