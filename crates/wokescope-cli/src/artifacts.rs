//! Precomputed JSON artifacts consumed by the static dashboard.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde_json::{Value, json};
use wokescope_core::aggregate::{
    GroupBy, compute_author_ranking, compute_field_trend, compute_journal_trend,
    compute_journal_year_heatmap, compute_year_stats, data_summary, emerging_keywords,
    journal_internal_ranking, keyword_cloud_by, keyword_over_time, moving_average, top_keywords,
};
use wokescope_core::config_file::AggregationSettings;
use wokescope_core::{Filters, ParsedRow, TypeCategory, journal_full_name};
use wokescope_parsing::RUNTIME_SCHEMA;

/// Papers kept at each end of a journal's internal ranking.
const JOURNAL_RANKING_LIMIT: usize = 10;
const RUNTIME_ROWS_DIR: &str = "runtime_rows";

/// A file listed in `manifest.json`.
#[derive(Debug, Clone, Serialize)]
pub struct WrittenFile {
    pub file: String,
    pub bytes: u64,
}

/// Compute every artifact as `(relative path, document)`.
pub fn build_artifacts(rows: &[ParsedRow], settings: &AggregationSettings) -> Vec<(String, Value)> {
    let years: Vec<i32> = sorted_unique(rows.iter().map(|r| r.year));
    let journals: Vec<String> = sorted_unique(rows.iter().map(|r| r.journal.clone()));
    let fields: Vec<String> = sorted_unique(rows.iter().map(|r| r.field.clone()));
    let present: BTreeSet<TypeCategory> = rows.iter().map(|r| r.type_main).collect();
    let types: Vec<&str> = TypeCategory::ALL
        .iter()
        .filter(|t| present.contains(*t))
        .map(TypeCategory::as_str)
        .collect();

    let full_selection = Filters {
        year_range: (
            years.first().copied().unwrap_or(0),
            years.last().copied().unwrap_or(0),
        ),
        journals: journals.clone(),
        fields: fields.clone(),
        types: types.iter().map(|t| t.to_string()).collect(),
        ..Filters::default()
    };

    let mut out: Vec<(String, Value)> = Vec::new();
    let mut push = |name: &str, value: Value| out.push((name.to_string(), value));

    push("summary.json", to_value(&data_summary(rows, &full_selection)));
    push(
        "filters.json",
        json!({
            "years": years,
            "journals": journals
                .iter()
                .map(|j| json!({ "code": j, "name": journal_full_name(j) }))
                .collect::<Vec<_>>(),
            "fields": fields,
            "types": types,
        }),
    );

    let year_stats = compute_year_stats(rows);
    let means: Vec<f64> = year_stats.iter().map(|s| s.mean).collect();
    let smoothed = moving_average(&means, settings.moving_average_window);
    push(
        "overall_trend.json",
        json!({
            "window": settings.moving_average_window,
            "stats": year_stats,
            "smoothed_mean": smoothed,
        }),
    );

    push(
        "journal_year_heatmap.json",
        json!({
            "by_name": compute_journal_year_heatmap(rows, false),
            "by_mean": compute_journal_year_heatmap(rows, true),
        }),
    );
    push(
        "field_trend.json",
        json!({
            "raw": compute_field_trend(rows, false),
            "normalized": compute_field_trend(rows, true),
        }),
    );
    push(
        "journal_trend.json",
        json!({
            "raw": compute_journal_trend(rows, false),
            "normalized": compute_journal_trend(rows, true),
        }),
    );
    push(
        "author_ranking.json",
        json!({
            "min_pubs": settings.min_author_pubs,
            "authors": compute_author_ranking(rows, settings.min_author_pubs),
        }),
    );

    let internal: BTreeMap<&str, Value> = journals
        .iter()
        .map(|j| {
            (
                j.as_str(),
                to_value(&journal_internal_ranking(rows, j, JOURNAL_RANKING_LIMIT)),
            )
        })
        .collect();
    push("journal_internal_ranking.json", to_value(&internal));

    let keyword_series: BTreeMap<String, Value> = top_keywords(rows, settings.top_keywords)
        .into_iter()
        .map(|k| {
            let series = to_value(&keyword_over_time(rows, &k.keyword));
            (k.keyword, series)
        })
        .collect();
    push(
        "keyword_over_time.json",
        json!({ "years": years, "series": keyword_series }),
    );

    push(
        "wordcloud_by_journal.json",
        to_value(&keyword_cloud_by(rows, GroupBy::Journal, settings.word_cloud_limit)),
    );
    push(
        "wordcloud_by_field.json",
        to_value(&keyword_cloud_by(rows, GroupBy::Field, settings.word_cloud_limit)),
    );
    push(
        "emerging_words.json",
        json!({
            "split_year": settings.split_year,
            "words": emerging_keywords(rows, settings.split_year, settings.word_cloud_limit),
        }),
    );

    let chunks = runtime_chunks(rows);
    let chunk_index: Vec<Value> = chunks
        .iter()
        .map(|(year, chunk)| {
            json!({
                "year": year,
                "path": format!("{RUNTIME_ROWS_DIR}/{year}.json"),
                "rows": chunk.len(),
            })
        })
        .collect();
    push(
        "runtime_rows_manifest.json",
        json!({
            "schema": RUNTIME_SCHEMA,
            "total_rows": rows.len(),
            "files": chunk_index,
        }),
    );
    for (year, chunk_rows) in chunks {
        push(
            &format!("{RUNTIME_ROWS_DIR}/{year}.json"),
            json!({ "year": year, "rows": chunk_rows }),
        );
    }

    for (_, value) in out.iter_mut() {
        round_floats(value);
    }
    out
}

/// Write artifacts under `out_dir`, then a `manifest.json` listing them.
pub fn write_artifacts(
    out_dir: &Path,
    artifacts: Vec<(String, Value)>,
    input: &Path,
) -> anyhow::Result<Vec<WrittenFile>> {
    let runtime_dir = out_dir.join(RUNTIME_ROWS_DIR);
    std::fs::create_dir_all(&runtime_dir)
        .with_context(|| format!("Failed to create output directory {}", runtime_dir.display()))?;
    remove_stale_chunks(&runtime_dir)?;

    let mut written = Vec::with_capacity(artifacts.len() + 1);
    for (name, value) in &artifacts {
        written.push(write_json(out_dir, name, value)?);
    }

    let manifest = json!({
        "input": input.display().to_string(),
        "files": written,
    });
    written.push(write_json(out_dir, "manifest.json", &manifest)?);
    Ok(written)
}

fn write_json(out_dir: &Path, name: &str, value: &Value) -> anyhow::Result<WrittenFile> {
    let path = out_dir.join(name);
    let bytes = serde_json::to_vec(value)?;
    std::fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(file = name, bytes = bytes.len(), "wrote artifact");
    Ok(WrittenFile {
        file: name.to_string(),
        bytes: bytes.len() as u64,
    })
}

fn remove_stale_chunks(dir: &Path) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "json") {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove stale chunk {}", path.display()))?;
        }
    }
    Ok(())
}

/// Rows grouped by year in [`RUNTIME_SCHEMA`] column order.
fn runtime_chunks(rows: &[ParsedRow]) -> BTreeMap<i32, Vec<Vec<String>>> {
    let mut chunks: BTreeMap<i32, Vec<Vec<String>>> = BTreeMap::new();
    for row in rows {
        let score = if row.is_scored() {
            row.woke_score.to_string()
        } else {
            String::new()
        };
        chunks.entry(row.year).or_default().push(vec![
            row.year.to_string(),
            row.vol.clone(),
            row.iss.clone(),
            row.author.clone(),
            row.title.clone(),
            row.r#abstract.clone(),
            row.url.clone(),
            row.type_raw.clone(),
            row.journal.clone(),
            row.field.clone(),
            score,
            row.keywords.clone(),
            row.justification.clone(),
        ]);
    }
    chunks
}

fn sorted_unique<T: Ord>(items: impl Iterator<Item = T>) -> Vec<T> {
    items.collect::<BTreeSet<_>>().into_iter().collect()
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Round every float in a document to 4 decimals.
pub fn round_floats(value: &mut Value) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(rounded) = n
                .as_f64()
                .map(|f| (f * 10_000.0).round() / 10_000.0)
                .and_then(serde_json::Number::from_f64)
            {
                *n = rounded;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(round_floats),
        Value::Object(map) => map.values_mut().for_each(round_floats),
        _ => {}
    }
}
