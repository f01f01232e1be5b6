//! Image metadata persistence

use super::{format_time, parse_time, SqliteStore};
use anyhow::{Context, Result};
use image_sources::{ImageRecord, ImageSource};
use rusqlite::{params, params_from_iter, types::Type, Row, ToSql};

use crate::models::{ImageFilter, SortOrder, StoredImage};

const IMAGE_COLUMNS: &str = "id, url, source, source_url, alt_text, width, height, size, \
                             format, tags, keyword, crawl_date";

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn row_to_image(row: &Row<'_>) -> rusqlite::Result<StoredImage> {
    let source: String = row.get(2)?;
    let source = source
        .parse::<ImageSource>()
        .map_err(|e| conversion_error(2, e))?;

    let tags: String = row.get(9)?;
    let tags: Vec<String> = serde_json::from_str(&tags).map_err(|e| conversion_error(9, e))?;

    let size: Option<i64> = row.get(7)?;
    let crawl_date: String = row.get(11)?;

    Ok(StoredImage {
        id: row.get(0)?,
        record: ImageRecord {
            url: row.get(1)?,
            source,
            source_url: row.get(3)?,
            alt_text: row.get(4)?,
            width: row.get(5)?,
            height: row.get(6)?,
            size: size.and_then(|s| u64::try_from(s).ok()),
            format: row.get(8)?,
            tags,
            keyword: row.get(10)?,
            crawl_date: parse_time(&crawl_date)?,
        },
    })
}

/// Escape LIKE wildcards so the keyword matches literally
fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl SqliteStore {
    /// Insert one image record, returning its row id
    pub fn insert_image(&self, image: &ImageRecord) -> Result<i64> {
        let tags = serde_json::to_string(&image.tags)?;
        let size = image.size.map(i64::try_from).transpose()?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO image_metadata (
                url, source, source_url, alt_text, width, height, size,
                format, tags, keyword, crawl_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                &image.url,
                image.source.as_str(),
                &image.source_url,
                &image.alt_text,
                image.width,
                image.height,
                size,
                &image.format,
                tags,
                &image.keyword,
                format_time(&image.crawl_date),
            ],
        )
        .with_context(|| format!("Failed to insert image {}", image.url))?;

        Ok(conn.last_insert_rowid())
    }

    /// Select images matching a filter, ordered by crawl date
    pub fn select_images(&self, filter: &ImageFilter) -> Result<Vec<StoredImage>> {
        let mut sql = format!("SELECT {} FROM image_metadata", IMAGE_COLUMNS);
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(keyword) = filter.keyword.as_deref().map(str::trim) {
            sql.push_str(
                r#"
                WHERE alt_text LIKE ?1 ESCAPE '\'
                   OR keyword LIKE ?1 ESCAPE '\'
                   OR EXISTS (
                       SELECT 1 FROM json_each(image_metadata.tags)
                       WHERE json_each.value = ?2
                   )
                "#,
            );
            values.push(Box::new(like_pattern(keyword)));
            values.push(Box::new(keyword.to_string()));
        }

        let direction = match filter.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        sql.push_str(&format!(
            " ORDER BY crawl_date {dir}, id {dir}",
            dir = direction
        ));

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let images = stmt
            .query_map(params_from_iter(values.iter()), row_to_image)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query images")?;

        Ok(images)
    }

    pub fn count_images(&self) -> Result<u64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM image_metadata", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
