use cipherforge::calibration::{CalibrationRow, SweepFailure, SweepKind};
use cipherforge::candidate::Candidate;
use cipherforge::pipeline::PipelineOutcome;
use cipherforge::scorer::BaselineStats;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

const PREVIEW_LEN: usize = 48;

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_LEN {
        format!("{}…", text.chars().take(PREVIEW_LEN).collect::<String>())
    } else {
        text.to_string()
    }
}

fn fmt_score(score: f64) -> String {
    if score.is_finite() {
        format!("{:.3}", score)
    } else {
        "-inf".to_string()
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right(table: &mut Table, cols: std::ops::RangeInclusive<usize>) {
    for i in cols {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_baseline_stats(text: &str, stats: &BaselineStats) {
    println!("\nText: {}", preview(text));
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Component").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    for (name, value) in stats.as_map() {
        let cell = Cell::new(format!("{:.4}", value));
        let cell = if name == "combined" {
            cell.fg(Color::Cyan).add_attribute(Attribute::Bold)
        } else {
            cell
        };
        table.add_row(vec![Cell::new(name), cell]);
    }
    align_right(&mut table, 1..=1);
    println!("{}", table);
}

pub fn print_stage_summary(outcome: &PipelineOutcome) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Stage").add_attribute(Attribute::Bold),
        Cell::new("Candidates"),
        Cell::new("Best").fg(Color::Cyan),
        Cell::new("ms"),
        Cell::new("Hit Rate"),
        Cell::new("Note"),
    ]);

    for r in &outcome.lineage {
        let ms = outcome.profile.stage_ms.get(&r.name).copied().unwrap_or(0);
        let hit_rate = outcome
            .profile
            .adaptive_diagnostics
            .get(&r.name)
            .map(|d| format!("{:.3}", d.median_wordlist_hit_rate))
            .unwrap_or_else(|| "-".to_string());
        let note = if let Some(err) = r.error() {
            Cell::new(err).fg(Color::Red)
        } else if outcome.profile.skipped.contains(&r.name) {
            Cell::new("skipped").fg(Color::Yellow)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(&r.name).add_attribute(Attribute::Bold),
            Cell::new(r.candidates().len()),
            Cell::new(fmt_score(r.score)).fg(Color::Cyan),
            Cell::new(ms),
            Cell::new(hit_rate),
            note,
        ]);
    }
    align_right(&mut table, 1..=4);
    println!("\n{}", table);
}

pub fn print_candidates(candidates: &[Candidate], n: usize) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Score").fg(Color::Cyan),
        Cell::new("Stage"),
        Cell::new("Text"),
    ]);
    for (i, c) in candidates.iter().take(n).enumerate() {
        let stage = c
            .meta()
            .get("source_stage")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(fmt_score(c.score())).fg(Color::Cyan),
            Cell::new(stage),
            Cell::new(preview(c.text())),
        ]);
    }
    align_right(&mut table, 0..=1);
    println!("\n{}", table);
}

pub fn print_calibration(
    kind: SweepKind,
    rows: &[CalibrationRow],
    failures: &[SweepFailure],
    pick: Option<f64>,
) {
    let mut table = new_table();
    table.add_row(vec![
        Cell::new(format!("{} weight", kind)).add_attribute(Attribute::Bold),
        Cell::new("Spearman").fg(Color::Cyan),
        Cell::new("Mean"),
        Cell::new("Spread"),
    ]);
    for r in rows {
        let marker = if Some(r.weight) == pick { " *" } else { "" };
        table.add_row(vec![
            Cell::new(format!("{}{}", r.weight, marker)),
            Cell::new(format!("{:.4}", r.spearman_vs_baseline)).fg(Color::Cyan),
            Cell::new(format!("{:.3}", r.mean_score)),
            Cell::new(format!("{:.3}", r.score_spread)),
        ]);
    }
    for f in failures {
        table.add_row(vec![
            Cell::new(f.weight),
            Cell::new(&f.reason).fg(Color::Red),
            Cell::new(""),
            Cell::new(""),
        ]);
    }
    align_right(&mut table, 0..=3);
    println!("\n{}", table);
    match pick {
        Some(w) => println!("🏆 Best {} weight: {}", kind, w),
        None => println!("⚠️  No usable {} rows", kind),
    }
}
