//! Terminal rendering for client records, field errors, and invoice analyses.

use chrono::NaiveDateTime;
use invoicedesk_ai::AnalysisReport;
use invoicedesk_core::{ClientRecord, FieldErrors, tax_id};

const EMPTY_DIRECTORY: &str = "No clients registered yet.";

/// Print the client list as an aligned table.
pub fn print_client_table(clients: &[ClientRecord]) {
    print!("{}", render_client_table(clients));
}

/// Print one client as a vertical card.
pub fn print_client_card(record: &ClientRecord) {
    print!("{}", render_client_card(record));
}

/// Print validation errors, one line per field.
pub fn print_field_errors(errors: &FieldErrors) {
    for (field, error) in errors.iter() {
        eprintln!("  {}", error.message(field));
    }
}

pub fn print_analysis(report: &AnalysisReport) {
    print!("{}", render_analysis(report));
}

pub fn format_date(ts: &NaiveDateTime) -> String {
    ts.format("%d/%m/%Y").to_string()
}

fn render_client_table(clients: &[ClientRecord]) -> String {
    if clients.is_empty() {
        return format!("{EMPTY_DIRECTORY}\n");
    }

    let header = ["ID", "Name", "Email", "CPF/CNPJ", "Created"];
    let rows: Vec<[String; 5]> = clients
        .iter()
        .map(|c| {
            [
                c.id.to_string(),
                c.name.clone(),
                c.email.clone(),
                tax_id::format(&c.tax_id),
                format_date(&c.created_at),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &header.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(rule.join("  ").as_str());
    out.push('\n');
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

// `{:<w$}` pads by chars, which keeps accented names aligned.
fn push_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn render_client_card(record: &ClientRecord) -> String {
    let kind = tax_id::kind(&record.tax_id);
    let mut out = format!("=== {} ===\n", record.name);
    out.push_str(&format!("  {:<26} {}\n", "ID", record.id));
    out.push_str(&format!("  {:<26} {}\n", "Email", record.email));
    out.push_str(&format!(
        "  {:<26} {} ({})\n",
        "CPF/CNPJ",
        tax_id::format(&record.tax_id),
        kind.as_str()
    ));
    out.push_str(&format!(
        "  {:<26} {}\n",
        "Created",
        format_date(&record.created_at)
    ));
    out
}

fn render_analysis(report: &AnalysisReport) -> String {
    let mut out = String::from("=== Invoice analysis ===\n");
    for (label, value) in report.rows() {
        out.push_str(&format!("  {label:<26} {value}\n"));
    }
    out
}
