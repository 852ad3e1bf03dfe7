use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::{RunPlan, RunReport, TopHit};

/// Lists longer than this are abbreviated to their first and last two names.
const MAX_DISPLAY: usize = 5;

/// `n columns: a, b` or `n columns: a, b, ... y, z` for long lists.
pub fn format_column_list(columns: &[String], max_display: usize) -> String {
    let n = columns.len();
    let plural = if n == 1 { "" } else { "s" };
    match n {
        0 => "(none)".to_string(),
        n if n <= max_display => format!("{n} column{plural}: {}", columns.join(", ")),
        n => format!(
            "{n} columns: {}, {}, ... {}, {}",
            columns[0],
            columns[1],
            columns[n - 2],
            columns[n - 1]
        ),
    }
}

/// Render the configuration summary shown before a run (and for dry runs).
pub fn config_table(plan: &RunPlan) -> Table {
    let config = &plan.config;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Setting"), header_cell("Value")]);
    apply_table_style(&mut table);
    let mut row = |label: &str, value: String| {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
    };
    row("Analysis type", config.analysis.to_string());
    row("Input file", plan.input.display().to_string());
    row("Output prefix", plan.output_prefix.display().to_string());
    row(
        "Predictors",
        format_column_list(plan.roles.predictors(), MAX_DISPLAY),
    );
    row(
        "Dependents",
        format_column_list(plan.roles.dependents(), MAX_DISPLAY),
    );
    row(
        "Covariates",
        format_column_list(plan.roles.covariates(), MAX_DISPLAY),
    );
    if !config.preprocess.categorical.is_empty() {
        row(
            "Categorical",
            format_column_list(&config.preprocess.categorical, MAX_DISPLAY),
        );
    }
    row("Model", config.model.description().to_string());
    row(
        "Missing values",
        config
            .preprocess
            .missing
            .map_or_else(|| "keep".to_string(), |policy| policy.to_string()),
    );
    if config.model.is_binary() {
        row("Minimum cases", config.min_cases.to_string());
    } else {
        row("Minimum observations", config.min_observations.to_string());
    }
    row(
        "Workers",
        format!(
            "{} x {} threads ({})",
            config.execution.workers,
            config.execution.threads_per_worker,
            config.execution.mode.as_str()
        ),
    );
    table
}

pub fn print_config_summary(plan: &RunPlan) {
    println!("Configuration summary:");
    println!("{}", config_table(plan));
}

/// Render the outcome counts table of a finished run.
pub fn counts_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Tasks"),
        header_cell("Completed"),
        header_cell("Skipped"),
        header_cell("Failed"),
        header_cell("Elapsed"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(report.n_tasks).add_attribute(Attribute::Bold),
        count_cell(report.counts.completed, Color::Green),
        count_cell(report.counts.skipped, Color::Yellow),
        count_cell(report.counts.failed, Color::Red),
        Cell::new(format!("{:.2}s", report.elapsed.as_secs_f64())),
    ]);
    table
}

/// Render the top hits, or `None` when nothing completed.
pub fn hits_table(hits: &[TopHit]) -> Option<Table> {
    if hits.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Predictor"),
        header_cell("Dependent"),
        header_cell("p-value"),
        header_cell("beta"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for hit in hits {
        table.add_row(vec![
            Cell::new(&hit.predictor)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&hit.dependent),
            Cell::new(format!("{:.3e}", hit.pval)),
            Cell::new(format!("{:.4}", hit.beta)),
        ]);
    }
    Some(table)
}

pub fn print_run_summary(report: &RunReport) {
    println!("{}", counts_table(report));
    if let Some(table) = hits_table(&report.top_hits) {
        println!();
        println!("Top hits:");
        println!("{table}");
    }
    println!();
    for path in &report.outputs {
        println!("Wrote {}", path.display());
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        Cell::new(count).fg(Color::DarkGrey)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
