//! Sheet table scanning: header location, column de-duplication, row
//! mapping.
//!
//! The tabs are hand-maintained and the header row is NOT at a fixed
//! position — title rows and notes come first. The header is located by
//! scanning the leading rows for the two required column names; a tab where
//! that fails is treated as empty, never as a parse error.

use std::collections::HashMap;

use staysync_domain::constants::HEADER_SCAN_ROWS;
use staysync_domain::{DateToken, RawReservation};

const START_COLUMN: &str = "Início";
const END_COLUMN: &str = "Fim";
const STATUS_COLUMN: &str = "Status";
const GUEST_COLUMN: &str = "Quem";
const ORIGIN_COLUMN: &str = "Origem";
const UPDATED_COLUMN: &str = "Última Atualização";

/// A tab's cells with the header located and duplicate columns removed.
#[derive(Debug)]
pub struct SheetTable {
    columns: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Locate the header in the leading rows and split the table there.
    ///
    /// Returns `None` when no row in the scan window carries both `Início`
    /// and `Fim`.
    pub fn from_cells(cells: Vec<Vec<String>>) -> Option<Self> {
        let header_index = cells.iter().take(HEADER_SCAN_ROWS).position(|row| {
            row.iter().any(|cell| cell.trim() == START_COLUMN)
                && row.iter().any(|cell| cell.trim() == END_COLUMN)
        })?;

        // Duplicate header names keep their first occurrence; the core
        // assumes column uniqueness from here on.
        let mut columns = HashMap::new();
        for (index, name) in cells[header_index].iter().enumerate() {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            columns.entry(name.to_string()).or_insert(index);
        }

        let rows = cells.into_iter().skip(header_index + 1).collect();
        Some(Self { columns, rows })
    }

    fn cell<'a>(&self, row: &'a [String], column: &str) -> Option<&'a str> {
        let index = *self.columns.get(column)?;
        row.get(index).map(|value| value.trim()).filter(|value| !value.is_empty())
    }

    /// Map data rows onto raw reservations.
    ///
    /// Rows with neither a start nor an end cell are spreadsheet padding and
    /// are skipped; rows with one blank date survive here and are counted as
    /// drops by the consolidator.
    pub fn reservations(&self) -> Vec<RawReservation> {
        let mut reservations = Vec::new();

        for row in &self.rows {
            let start = self.cell(row, START_COLUMN);
            let end = self.cell(row, END_COLUMN);
            if start.is_none() && end.is_none() {
                continue;
            }

            reservations.push(RawReservation {
                start: DateToken::Text(start.unwrap_or_default().to_string()),
                end: DateToken::Text(end.unwrap_or_default().to_string()),
                status: self.cell(row, STATUS_COLUMN).map(str::to_string),
                guest: self.cell(row, GUEST_COLUMN).map(str::to_string),
                origin: self.cell(row, ORIGIN_COLUMN).map(str::to_string),
                updated_at: self.cell(row, UPDATED_COLUMN).map(str::to_string),
            });
        }

        reservations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter().map(|row| row.iter().map(|cell| cell.to_string()).collect()).collect()
    }

    #[test]
    fn header_is_located_past_title_rows() {
        let table = SheetTable::from_cells(cells(&[
            &["Reservas SM-C108", "", ""],
            &["", "", ""],
            &["Início", "Fim", "Quem"],
            &["8-dez.23-qui.", "10-dez.23-sáb.", "Maria"],
        ]))
        .unwrap();

        let reservations = table.reservations();
        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].guest.as_deref(), Some("Maria"));
    }

    #[test]
    fn missing_header_yields_none() {
        assert!(SheetTable::from_cells(cells(&[
            &["just", "some", "cells"],
            &["no", "dates", "here"],
        ]))
        .is_none());
    }

    #[test]
    fn header_beyond_the_scan_window_is_not_found() {
        let mut rows: Vec<Vec<String>> = (0..HEADER_SCAN_ROWS)
            .map(|i| vec![format!("note {i}")])
            .collect();
        rows.push(vec!["Início".into(), "Fim".into()]);

        assert!(SheetTable::from_cells(rows).is_none());
    }

    #[test]
    fn duplicate_columns_keep_the_first_occurrence() {
        let table = SheetTable::from_cells(cells(&[
            &["Início", "Fim", "Início", "Quem"],
            &["01/07/2024", "05/07/2024", "99/99/9999", "Maria"],
        ]))
        .unwrap();

        let reservations = table.reservations();
        assert_eq!(reservations[0].start, DateToken::Text("01/07/2024".into()));
    }

    #[test]
    fn padding_rows_are_skipped() {
        let table = SheetTable::from_cells(cells(&[
            &["Início", "Fim"],
            &["01/07/2024", "05/07/2024"],
            &["", ""],
            &["", ""],
        ]))
        .unwrap();

        assert_eq!(table.reservations().len(), 1);
    }

    #[test]
    fn half_blank_rows_survive_for_the_consolidator_to_count() {
        let table = SheetTable::from_cells(cells(&[
            &["Início", "Fim"],
            &["01/07/2024", ""],
        ]))
        .unwrap();

        let reservations = table.reservations();
        assert_eq!(reservations.len(), 1);
        assert!(reservations[0].end.is_blank());
    }

    #[test]
    fn optional_columns_are_nullable() {
        let table = SheetTable::from_cells(cells(&[
            &["Início", "Fim"],
            &["01/07/2024", "05/07/2024"],
        ]))
        .unwrap();

        let reservations = table.reservations();
        assert!(reservations[0].guest.is_none());
        assert!(reservations[0].origin.is_none());
        assert!(reservations[0].status.is_none());
    }
}
