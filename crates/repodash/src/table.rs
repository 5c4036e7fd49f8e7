use chrono::{DateTime, Utc};

use repodash_core::display::{row_cells, COLUMN_HEADERS};
use repodash_core::RepoRecord;

/// Plain aligned-column rendering of the record snapshot, header first.
/// Column widths grow to the widest cell; rows keep snapshot order and
/// a 1-based index column.
pub fn render_table(records: &[RepoRecord], now: DateTime<Utc>) -> String {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(records.len() + 1);
    rows.push(COLUMN_HEADERS.iter().map(|h| h.to_string()).collect());
    for (i, record) in records.iter().enumerate() {
        let mut cells = Vec::with_capacity(COLUMN_HEADERS.len());
        cells.push((i + 1).to_string());
        cells.extend(row_cells(record, now));
        rows.push(cells);
    }

    let mut widths = vec![0usize; COLUMN_HEADERS.len()];
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(cell);
            let pad = widths[i].saturating_sub(cell.chars().count());
            line.extend(std::iter::repeat(' ').take(pad));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
