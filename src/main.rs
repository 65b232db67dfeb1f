mod input;
mod settings;

use std::borrow::Cow;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use asignacion_parser::parser::{self, classify, sections, tables};
use asignacion_parser::period::{find_period, validate_cedula, Period};
use asignacion_parser::records::ActivityRecord;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use input::PageKind;
use settings::{OutputFormat, Settings};

#[derive(Parser)]
#[command(name = "asignacion_parser", about = "Univalle teaching-assignment page extractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract activity records from one saved page
    Extract {
        file: PathBuf,
        /// Academic period, e.g. 2024-1 (default: ASIGNACION_PERIODO, then the page banner)
        #[arg(short, long)]
        periodo: Option<String>,
        /// Output format (default: ASIGNACION_FORMAT, then json)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Flag records whose cedula differs from this one
        #[arg(long)]
        cedula: Option<String>,
    },
    /// Dump table segmentation and classification for a page
    Tables { file: PathBuf },
    /// Extract every .html page in a directory, one JSON record per line
    Batch {
        dir: PathBuf,
        #[arg(short, long)]
        periodo: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Commands::Extract {
            file,
            periodo,
            format,
            cedula,
        } => {
            let expected = cedula.as_deref().map(validate_cedula).transpose()?;
            let override_periodo = explicit_periodo(periodo.or(settings.periodo))?;
            let html = read_data_page(&file)?;
            let periodo = resolve_periodo(override_periodo, &html, &file);

            let out = parser::process_document(&html, &periodo);
            out.validate(expected.as_deref());

            let stdout = io::stdout();
            let mut w = BufWriter::new(stdout.lock());
            match format.or(settings.format).unwrap_or_default() {
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut w, &out.records)?;
                    writeln!(w)?;
                }
                OutputFormat::Tsv => write_tsv(&mut w, &out.records)?,
                OutputFormat::Table => write_table(&mut w, &out.records)?,
            }
            w.flush()?;
        }
        Commands::Tables { file } => {
            let html = input::load(&file)?;
            dump_tables(&html);
        }
        Commands::Batch { dir, periodo } => {
            let override_periodo = explicit_periodo(periodo.or(settings.periodo))?;
            run_batch(&dir, override_periodo)?;
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        info!(secs = elapsed.as_secs_f64(), "done");
    }
    Ok(())
}

fn explicit_periodo(raw: Option<String>) -> Result<Option<Period>> {
    raw.map(|p| Period::parse(&p))
        .transpose()
        .context("bad --periodo / ASIGNACION_PERIODO")
}

/// Explicit period, else the first one the page mentions, else empty.
fn resolve_periodo(explicit: Option<Period>, html: &str, file: &Path) -> String {
    match explicit.or_else(|| find_period(&tables::document_text(html))) {
        Some(p) => p.to_string(),
        None => {
            warn!(file = %file.display(), "no period given or found on the page");
            String::new()
        }
    }
}

fn read_data_page(file: &Path) -> Result<String> {
    let html = input::load(file)?;
    match PageKind::detect(&html) {
        PageKind::Data => {}
        PageKind::Login => warn!(file = %file.display(), "page looks like a login form"),
        PageKind::Error => warn!(file = %file.display(), "page looks like a server error"),
    }
    Ok(html)
}

// ── Output ──

fn write_tsv(w: &mut impl Write, records: &[ActivityRecord]) -> io::Result<()> {
    writeln!(w, "{}", ActivityRecord::COLUMNS.join("\t"))?;
    for r in records {
        let row: Vec<String> = r.to_row().into_iter().map(|v| v.replace('\t', " ")).collect();
        writeln!(w, "{}", row.join("\t"))?;
    }
    Ok(())
}

fn write_table(w: &mut impl Write, records: &[ActivityRecord]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(w, "No activities found.");
    }
    let first = &records[0];
    writeln!(w, "{} | {} | {}", first.cedula, first.nombre_profesor, first.periodo)?;
    writeln!(w, "{} / {}", first.departamento, first.escuela)?;
    writeln!(w)?;
    writeln!(
        w,
        "{:>3} | {:<26} | {:<48} | {:>7} | {:<24}",
        "#", "Tipo", "Actividad", "Horas", "Detalle"
    )?;
    writeln!(w, "{}", "-".repeat(118))?;
    for (i, r) in records.iter().enumerate() {
        writeln!(
            w,
            "{:>3} | {:<26} | {:<48} | {:>7.1} | {:<24}",
            i + 1,
            clip(&r.tipo_actividad, 26),
            clip(&r.nombre_actividad, 48),
            r.numero_horas,
            clip(&r.actividad, 24)
        )?;
    }
    let total: f64 = records.iter().map(|r| r.numero_horas).sum();
    writeln!(w, "\n{} activities | {:.1} hours", records.len(), total)
}

fn dump_tables(html: &str) {
    let fragments = tables::segment(html);
    println!(
        "{:>3} | {:>6} | {:>4} | {:<16} | {:<24} | {}",
        "#", "parent", "rows", "title", "kind", "first row"
    );
    println!("{}", "-".repeat(100));
    for t in &fragments {
        let title = sections::title_section(t)
            .map(|s| format!("{s:?}"))
            .unwrap_or_default();
        let kind = if t.is_blank() {
            "blank".to_string()
        } else {
            classify::classify(t, &fragments)
                .map(|k| format!("{k:?}"))
                .unwrap_or_else(|| "-".into())
        };
        let parent = t.parent.map(|p| p.to_string()).unwrap_or_default();
        let first = t.header().map(|r| r.joined()).unwrap_or_default();
        println!(
            "{:>3} | {:>6} | {:>4} | {:<16} | {:<24} | {}",
            t.index,
            parent,
            t.rows.len(),
            title,
            clip(&kind, 24),
            clip(&first, 60)
        );
    }
}

// ── Batch ──

fn html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn run_batch(dir: &Path, periodo: Option<Period>) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let files = html_files(dir)?;
    if files.is_empty() {
        println!("No .html files in {}", dir.display());
        return Ok(());
    }
    info!(files = files.len(), dir = %dir.display(), "batch start");

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let stdout = io::stdout();
    let mut w = BufWriter::new(stdout.lock());
    let (mut pages, mut records, mut failed, mut flagged) = (0usize, 0usize, 0usize, 0usize);

    for chunk in files.chunks(64) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|file| -> Result<_> {
                let html = read_data_page(file)?;
                let periodo = resolve_periodo(periodo, &html, file);
                Ok(parser::process_document(&html, &periodo))
            })
            .collect();

        for (file, result) in chunk.iter().zip(results) {
            match result {
                Ok(out) => {
                    pages += 1;
                    let report = out.validate(None);
                    flagged += report.flagged_count();
                    for r in &out.records {
                        serde_json::to_writer(&mut w, r)?;
                        writeln!(w)?;
                    }
                    records += out.records.len();
                }
                Err(err) => {
                    failed += 1;
                    pb.suspend(|| warn!(file = %file.display(), error = %err, "page skipped"));
                }
            }
        }
        pb.inc(chunk.len() as u64);
    }

    w.flush()?;
    pb.finish_and_clear();
    info!(pages, records, failed, flagged, "batch done");
    Ok(())
}

/// At most `width` chars of `s`; a clipped value ends in `…` within the width.
fn clip(s: &str, width: usize) -> Cow<'_, str> {
    match s.char_indices().nth(width) {
        None => Cow::Borrowed(s),
        Some(_) => {
            let keep = width.saturating_sub(1);
            let end = s.char_indices().nth(keep).map_or(s.len(), |(i, _)| i);
            Cow::Owned(format!("{}…", &s[..end]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_keeps_short_values() {
        assert_eq!(clip("TEORICA", 24), "TEORICA");
        assert_eq!(clip("ABCD", 4), "ABCD");
    }

    #[test]
    fn clip_counts_chars_not_bytes() {
        assert_eq!(clip("INVESTIGACIÓN", 6), "INVES…");
        assert_eq!(clip("DIRECCIÓN DE TESIS", 9).chars().count(), 9);
    }
}
