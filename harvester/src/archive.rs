//! Zip bundles of stored images

use anyhow::{Context, Result};
use reqwest::Client;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::models::StoredImage;

/// A finished archive plus what went into it
#[derive(Debug)]
pub struct ArchiveSummary {
    pub bytes: Vec<u8>,
    pub included: usize,
    pub skipped: usize,
}

/// Download every image and pack it into a deflated zip
///
/// Images that cannot be fetched are skipped.
pub async fn build_archive(client: &Client, images: &[StoredImage]) -> Result<ArchiveSummary> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut names = HashSet::new();
    let mut included = 0;
    let mut skipped = 0;

    for image in images {
        let body = match fetch(client, &image.record.url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(url = %image.record.url, error = %e, "Skipping image");
                skipped += 1;
                continue;
            }
        };

        let name = unique_name(&mut names, image.id, entry_name(image));

        writer
            .start_file(name.as_str(), options)
            .with_context(|| format!("Failed to add {} to archive", name))?;
        writer.write_all(&body)?;
        included += 1;
    }

    let bytes = writer
        .finish()
        .context("Failed to finish archive")?
        .into_inner();

    tracing::debug!(included, skipped, size = bytes.len(), "Built image archive");

    Ok(ArchiveSummary {
        bytes,
        included,
        skipped,
    })
}

async fn fetch(client: &Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// Reserve `name`, falling back to `{id}_{name}` then `{id}_{n}_{name}`
fn unique_name(taken: &mut HashSet<String>, id: i64, name: String) -> String {
    if taken.insert(name.clone()) {
        return name;
    }

    let mut candidate = format!("{}_{}", id, name);
    let mut n = 1;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{}_{}_{}", id, n, name);
        n += 1;
    }
    candidate
}

/// Last URL path segment, or `{keyword}_{id}.jpg` when it has no extension
fn entry_name(image: &StoredImage) -> String {
    let url = &image.record.url;
    let segment = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .unwrap_or_default()
            .to_string(),
    };

    if segment.is_empty() || !segment.contains('.') {
        let keyword: String = image
            .record
            .keyword
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        format!("{}_{}.jpg", keyword.trim_matches('.'), image.id)
    } else {
        segment
    }
}
