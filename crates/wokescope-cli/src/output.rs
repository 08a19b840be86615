use std::io::Write;
use std::path::Path;

use owo_colors::OwoColorize;
use wokescope_parsing::{AuthorExtraction, ParsedRow};

use crate::artifacts::WrittenFile;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Running totals for the inspector footer.
#[derive(Debug, Default)]
pub struct InspectTotals {
    pub rows: usize,
    pub authors: usize,
    pub chunks: usize,
    pub rejected: usize,
    pub empty_rows: usize,
}

impl InspectTotals {
    pub fn add(&mut self, extraction: &AuthorExtraction) {
        self.rows += 1;
        self.authors += extraction.authors.len();
        self.chunks += extraction.chunks_total;
        self.rejected += extraction.chunks_rejected;
        if extraction.authors.is_empty() {
            self.empty_rows += 1;
        }
    }
}

fn shorten(text: &str, max_chars: usize) -> String {
    let collapsed: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > max_chars {
        let cut: String = collapsed.chars().take(max_chars).collect();
        format!("{cut}...")
    } else {
        collapsed
    }
}

pub fn print_inspect_header(
    w: &mut dyn Write,
    input: &Path,
    rows: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| input.display().to_string());
    if color.enabled() {
        writeln!(w, "{} {} ({} rows)\n", "DRY RUN:".bold().cyan(), name.bold(), rows)?;
    } else {
        writeln!(w, "DRY RUN: {} ({} rows)\n", name, rows)?;
    }
    Ok(())
}

/// Print one row: raw byline, extracted names, classified type.
pub fn print_inspect_row(
    w: &mut dyn Write,
    index: usize,
    row: &ParsedRow,
    extraction: &AuthorExtraction,
    color: ColorMode,
) -> std::io::Result<()> {
    let label = format!("[{}] {} {}", index + 1, row.journal, row.year);
    if color.enabled() {
        writeln!(w, "{}", label.bold().yellow())?;
    } else {
        writeln!(w, "{}", label)?;
    }

    writeln!(w, "  Title:   {}", shorten(&row.title, 100))?;
    let raw = shorten(&row.author, 200);
    if color.enabled() {
        writeln!(w, "  Raw:     {}", raw.dimmed())?;
    } else {
        writeln!(w, "  Raw:     {}", raw)?;
    }

    let authors = if extraction.authors.is_empty() {
        "(none)".to_string()
    } else {
        extraction.authors.join("; ")
    };
    if color.enabled() && extraction.authors.is_empty() {
        writeln!(w, "  Authors: {}", authors.red())?;
    } else if color.enabled() {
        writeln!(w, "  Authors: {}", authors.green())?;
    } else {
        writeln!(w, "  Authors: {}", authors)?;
    }

    if extraction.chunks_rejected > 0 {
        let msg = format!(
            "{} of {} chunks rejected{}",
            extraction.chunks_rejected,
            extraction.chunks_total,
            if extraction.had_affiliation {
                " (affiliation text present)"
            } else {
                ""
            }
        );
        if color.enabled() {
            writeln!(w, "  {}", msg.dimmed())?;
        } else {
            writeln!(w, "  {}", msg)?;
        }
    }

    writeln!(w, "  Type:    {} (raw: {:?})", row.type_main, row.type_raw)?;
    if row.is_scored() {
        writeln!(w, "  Score:   {}", row.woke_score)?;
    } else {
        writeln!(w, "  Score:   unscored")?;
    }
    writeln!(w)
}

pub fn print_inspect_totals(
    w: &mut dyn Write,
    totals: &InspectTotals,
    color: ColorMode,
) -> std::io::Result<()> {
    let sep = "=".repeat(60);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{}", "SUMMARY".bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "SUMMARY")?;
        writeln!(w, "{}", sep)?;
    }
    writeln!(w, "  Rows: {}", totals.rows)?;
    writeln!(w, "  Authors extracted: {}", totals.authors)?;
    writeln!(w, "  Chunks: {} ({} rejected)", totals.chunks, totals.rejected)?;
    if totals.empty_rows > 0 {
        let msg = format!("Rows with no author: {}", totals.empty_rows);
        if color.enabled() {
            writeln!(w, "  {}", msg.yellow())?;
        } else {
            writeln!(w, "  {}", msg)?;
        }
    }
    Ok(())
}

pub fn print_build_summary(
    w: &mut dyn Write,
    out_dir: &Path,
    rows: usize,
    files: &[WrittenFile],
    color: ColorMode,
) -> std::io::Result<()> {
    let heading = format!("Generated JSON artifacts from {} rows in {}:", rows, out_dir.display());
    if color.enabled() {
        writeln!(w, "{}", heading.bold())?;
    } else {
        writeln!(w, "{}", heading)?;
    }
    for file in files {
        if color.enabled() {
            writeln!(w, "- {}: {}", file.file, format!("{} bytes", file.bytes).dimmed())?;
        } else {
            writeln!(w, "- {}: {} bytes", file.file, file.bytes)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_inspect_row() {
        let row = ParsedRow {
            year: 2020,
            journal: "AMJ".to_string(),
            title: "Voice".to_string(),
            author: "Jane Doe Search for more papers by this author".to_string(),
            woke_score: 4,
            ..Default::default()
        };
        let extraction = AuthorExtraction {
            authors: vec!["Jane Doe".to_string()],
            chunks_total: 1,
            ..Default::default()
        };
        let mut buf = Vec::new();
        print_inspect_row(&mut buf, 0, &row, &extraction, ColorMode(false)).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("[1] AMJ 2020\n"));
        assert!(text.contains("  Authors: Jane Doe\n"));
        assert!(text.contains("  Type:    Unknown (raw: \"\")\n"));
        assert!(text.contains("  Score:   4\n"));
        assert!(!text.contains("rejected"));
    }

    #[test]
    fn shorten_counts_chars() {
        assert_eq!(shorten("Ångström   Müller", 20), "Ångström Müller");
        assert_eq!(shorten("abcdef", 3), "abc...");
    }

    #[test]
    fn totals_accumulate() {
        let mut totals = InspectTotals::default();
        totals.add(&AuthorExtraction {
            authors: vec![],
            chunks_total: 2,
            chunks_rejected: 2,
            had_affiliation: true,
        });
        assert_eq!(totals.rows, 1);
        assert_eq!(totals.empty_rows, 1);
        assert_eq!(totals.rejected, 2);
    }
}
