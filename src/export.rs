use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::table::Table;

/// Writes the currently displayed tabular result to a one-sheet workbook.
/// Returns the path it wrote to.
pub fn export_table(table: &Table, sheet_name: &str) -> Result<PathBuf> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = PathBuf::from(format!("footdb_export_{stamp}.xlsx"));
    write_workbook(&path, table, sheet_name)?;
    Ok(path)
}

pub fn write_workbook(path: &Path, table: &Table, sheet_name: &str) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    // Sheet names are capped at 31 chars by the format.
    let name: String = sheet_name.chars().take(31).collect();
    worksheet
        .set_name(&name)
        .with_context(|| format!("name worksheet {name:?}"))?;
    write_sheet(worksheet, table)?;
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, table: &Table) -> Result<()> {
    let header = Format::new().set_bold();
    for (col_idx, column) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_idx as u16, column, &header)
            .with_context(|| format!("write header cell {col_idx}"))?;
    }
    for (row_idx, row) in table.rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            worksheet
                .write_string((row_idx + 1) as u32, col_idx as u16, cell.display())
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_workbook;
    use crate::table::{CellValue, Table};

    #[test]
    fn workbook_writes_without_error() {
        let mut table = Table::new(vec!["team".into(), "wins".into()]);
        table.push_row(vec![CellValue::Text("Brazil".into()), CellValue::Integer(8)]);
        table.push_row(vec![CellValue::Text("Italy".into()), CellValue::Integer(6)]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_workbook(&path, &table, "Winning Teams").expect("export should succeed");
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
