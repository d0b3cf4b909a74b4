//! Spreadsheets and CSV files rendered as plain text.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Reader, Xlsx, XlsxError};
use tracing::debug;

use super::Result;
use crate::error::ExtractionError;

/// Every worksheet, rows tab-joined, sheets separated by a blank line.
pub fn xlsx_to_text(bytes: &[u8]) -> Result<String> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).map_err(
        |e: XlsxError| ExtractionError::Parse {
            format: "xlsx",
            reason: e.to_string(),
        },
    )?;

    let mut sheets = Vec::new();
    for (name, range) in workbook.worksheets() {
        debug!("Reading worksheet {} ({:?})", name, range.get_size());
        let rows: Vec<String> = range
            .rows()
            .map(|row| row.iter().map(ToString::to_string).collect::<Vec<_>>())
            .filter(|cells| cells.iter().any(|c| !c.is_empty()))
            .map(|cells| cells.join("\t"))
            .collect();
        sheets.push(rows.join("\n"));
    }

    Ok(sheets.join("\n\n"))
}

/// CSV rows with columns padded to a common width.
pub fn csv_to_text(bytes: &[u8]) -> Result<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let rows = reader
        .records()
        .map(|record| record.map(|r| r.iter().map(str::to_string).collect::<Vec<_>>()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ExtractionError::Parse {
            format: "csv",
            reason: e.to_string(),
        })?;

    Ok(align_columns(&rows))
}

fn align_columns(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|row| {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
