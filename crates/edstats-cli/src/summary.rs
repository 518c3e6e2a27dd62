use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use edstats_cli::types::StageResult;
use edstats_model::{DataIssue, IssueSeverity};

pub fn print_summary(result: &StageResult) {
    println!("Output: {}", result.output.display());
    println!("SHA-256: {}", result.sha256);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Inputs"),
        header_cell("Rows"),
        header_cell("Columns"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let inputs: Vec<String> = result
        .inputs
        .iter()
        .map(|path| path.display().to_string())
        .collect();
    table.add_row(vec![
        Cell::new(&result.stage)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(inputs.join("\n")),
        Cell::new(result.rows),
        Cell::new(result.columns),
        count_cell(result.error_count(), Color::Red),
        count_cell(result.warning_count(), Color::Yellow),
    ]);
    println!("{table}");
    for note in &result.notes {
        println!("- {note}");
    }
    print_issue_table(result);
}

fn print_issue_table(result: &StageResult) {
    let mut issues: Vec<(&str, &DataIssue)> = result
        .reports
        .iter()
        .flat_map(|report| {
            report
                .issues
                .iter()
                .map(move |issue| (report.stage.as_str(), issue))
        })
        .collect();
    if issues.is_empty() {
        return;
    }
    issues.sort_by(|a, b| {
        severity_rank(b.1.severity())
            .cmp(&severity_rank(a.1.severity()))
            .then_with(|| a.0.cmp(b.0))
            .then_with(|| a.1.kind.cmp(&b.1.kind))
            .then_with(|| a.1.column.cmp(&b.1.column))
    });
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Severity"),
        header_cell("Kind"),
        header_cell("Column"),
        header_cell("Count"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);
    for (stage, issue) in issues {
        table.add_row(vec![
            dim_cell(stage),
            severity_cell(issue.severity()),
            Cell::new(issue.kind.label()),
            issue
                .column
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(issue.count).fg(severity_color(issue.severity())),
            Cell::new(&issue.message),
        ]);
    }
    println!();
    println!("Issues:");
    println!("{table}");
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(10)),
            ColumnConstraint::UpperBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
            ColumnConstraint::LowerBoundary(Width::Fixed(5)),
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
        ]);
    }
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
        dim_cell(count)
    }
}

fn severity_cell(severity: IssueSeverity) -> Cell {
    match severity {
        IssueSeverity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        IssueSeverity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn severity_rank(severity: IssueSeverity) -> u8 {
    match severity {
        IssueSeverity::Error => 2,
        IssueSeverity::Warning => 1,
    }
}

fn severity_color(severity: IssueSeverity) -> Color {
    match severity {
        IssueSeverity::Error => Color::Red,
        IssueSeverity::Warning => Color::Yellow,
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
