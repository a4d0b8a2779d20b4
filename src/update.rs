//! Sequential update driver and coverage report for the publications file.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

use crate::inspire::{InspireClient, MetadataSource};
use crate::merge::{diff_changes, merge_metadata};
use crate::publication::{self, Publication, is_blank};
use crate::resolver;
use crate::throttle::{FixedDelay, Throttle};

/// Pause after every unsuccessful eprint or DOI query.
pub const LOOKUP_COOLDOWN: Duration = Duration::from_secs(1);
/// Pause after every record, resolved or not.
pub const RECORD_SPACING: Duration = Duration::from_secs(2);

#[derive(Debug, Default, PartialEq)]
pub struct UpdateOutcome {
    pub updated: usize,
    pub failed: usize,
    pub total: usize,
}

/// Walks the whole collection once, resolving and merging each record, then
/// rewrites the file in full. Collection length and record order never change;
/// a record that resolves to nothing is written back untouched.
pub fn update_publications(
    path: &Path,
    source: &dyn MetadataSource,
    cooldown: &dyn Throttle,
    spacing: &dyn Throttle,
) -> anyhow::Result<UpdateOutcome> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let mut records = publication::load(path)?;
    eprintln!("Updating {} publications...", records.len());

    let progress = ProgressBar::new(records.len() as u64);
    progress.set_style(ProgressStyle::with_template("[{pos}/{len}] {wide_msg}").unwrap());

    let mut updated = 0usize;
    let mut failed = 0usize;
    for record in records.iter_mut() {
        let label: String = record
            .title
            .as_deref()
            .unwrap_or("Unknown Title")
            .chars()
            .take(60)
            .collect();
        progress.set_message(format!("Processing: {label}"));

        match resolver::resolve(source, cooldown, record) {
            Some(found) => {
                let merged = merge_metadata(record, &found);
                let changes = diff_changes(record, &merged);
                if changes.is_empty() {
                    progress
                        .suspend(|| eprintln!("  no changes (citations: {})", merged.citation_count()));
                } else {
                    progress.suspend(|| {
                        eprintln!("  {} updated: {}", "✓".green(), changes.join(", "))
                    });
                    updated += 1;
                }
                *record = merged;
            }
            None => {
                progress.suspend(|| eprintln!("  {} could not find INSPIRE-HEP data", "✗".red()));
                failed += 1;
            }
        }
        spacing.pause();
        progress.inc(1);
    }
    progress.finish_and_clear();

    publication::save(path, &records)?;

    let outcome = UpdateOutcome {
        updated,
        failed,
        total: records.len(),
    };
    eprintln!("{}", "=".repeat(50));
    eprintln!(
        "{} {} updated  {} {} failed",
        "✓".green(),
        outcome.updated,
        "✗".red(),
        outcome.failed
    );
    eprintln!("saved {} ({} records)", path.display(), outcome.total);

    Ok(outcome)
}

/// Aggregate statistics over the stored collection.
#[derive(Debug, PartialEq)]
pub struct CoverageReport {
    pub total_publications: usize,
    pub total_citations: u64,
    pub with_inspire_id: usize,
    pub coverage: String,
    pub last_update: String,
    pub categories: Vec<(String, usize)>,
}

pub fn generate_report(path: &Path) -> anyhow::Result<CoverageReport> {
    let records = publication::load(path)?;
    Ok(report_for(&records))
}

pub fn report_for(records: &[Publication]) -> CoverageReport {
    let total = records.len();
    let total_citations = records.iter().map(Publication::citation_count).sum();
    let with_inspire_id = records.iter().filter(|r| !is_blank(&r.inspire_id)).count();
    let coverage = if total == 0 {
        "0.0%".to_string()
    } else {
        format!("{:.1}%", with_inspire_id as f64 * 100.0 / total as f64)
    };
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        for category in record.categories.iter().flatten() {
            *counts.entry(category.clone()).or_default() += 1;
        }
    }
    CoverageReport {
        total_publications: total,
        total_citations,
        with_inspire_id,
        coverage,
        last_update: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        categories: counts.into_iter().collect(),
    }
}

fn print_report(report: &CoverageReport) {
    eprintln!("  total_publications: {}", report.total_publications);
    eprintln!("  total_citations: {}", report.total_citations);
    eprintln!("  with_inspire_id: {}", report.with_inspire_id);
    eprintln!("  coverage: {}", report.coverage);
    eprintln!("  last_update: {}", report.last_update);
    if !report.categories.is_empty() {
        let line: Vec<String> = report
            .categories
            .iter()
            .map(|(category, n)| format!("{category} ({n})"))
            .collect();
        eprintln!("  categories: {}", line.join(", "));
    }
}

/// CLI entry for the updater: status report, full update pass, fresh report.
/// Failures are reported on the console rather than raised.
pub fn run(file: &Path) {
    eprintln!("INSPIRE-HEP metadata updater");
    eprintln!("{}", "=".repeat(50));
    match generate_report(file) {
        Ok(report) => {
            eprintln!("Current status:");
            print_report(&report);
        }
        Err(e) => eprintln!("Report generation failed: {e:#}"),
    }
    eprintln!();
    eprintln!("Starting update...");

    let client = InspireClient::new();
    let cooldown = FixedDelay::new(LOOKUP_COOLDOWN);
    let spacing = FixedDelay::new(RECORD_SPACING);
    match update_publications(file, &client, &cooldown, &spacing) {
        Ok(_) => match generate_report(file) {
            Ok(report) => {
                eprintln!();
                eprintln!("Updated status:");
                print_report(&report);
            }
            Err(e) => eprintln!("Report generation failed: {e:#}"),
        },
        Err(e) => eprintln!("{} update failed: {e:#}", "✗".red()),
    }
}
