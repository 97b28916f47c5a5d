use rusqlite::types::ValueRef;

/// A single cell of a tabular query result.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl CellValue {
    pub fn from_sql(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(n) => CellValue::Integer(n),
            ValueRef::Real(f) => CellValue::Real(f),
            ValueRef::Text(bytes) => {
                CellValue::Text(String::from_utf8_lossy(bytes).into_owned())
            }
            ValueRef::Blob(bytes) => CellValue::Blob(bytes.to_vec()),
        }
    }

    /// Rendering/export form. Reals keep two decimals so ranked percentage
    /// columns line up; the stored value itself is untruncated.
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Integer(n) => n.to_string(),
            CellValue::Real(f) => format!("{f:.2}"),
            CellValue::Text(s) => s.clone(),
            CellValue::Blob(bytes) => format!("<blob {} bytes>", bytes.len()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

/// An ordered tabular result: column names as the statement projected them,
/// rows in server-returned order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.eq_ignore_ascii_case(name))
    }

    /// Per-column display widths, clamped so one long cell cannot eat the
    /// whole terminal row.
    pub fn column_widths(&self, max: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                if idx < widths.len() {
                    widths[idx] = widths[idx].max(cell.display().len());
                }
            }
        }
        for width in &mut widths {
            *width = (*width).min(max).max(3);
        }
        widths
    }
}

#[cfg(test)]
mod tests {
    use super::{CellValue, Table};

    #[test]
    fn display_forms() {
        assert_eq!(CellValue::Null.display(), "");
        assert_eq!(CellValue::Integer(7).display(), "7");
        assert_eq!(CellValue::Real(66.666_666).display(), "66.67");
        assert_eq!(CellValue::Text("Brazil".into()).display(), "Brazil");
        assert_eq!(CellValue::Blob(vec![0, 1]).display(), "<blob 2 bytes>");
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let table = Table::new(vec!["Team".into(), "total_goals".into()]);
        assert_eq!(table.column_index("team"), Some(0));
        assert_eq!(table.column_index("TOTAL_GOALS"), Some(1));
        assert_eq!(table.column_index("missing"), None);
    }

    #[test]
    fn widths_cover_header_and_cells() {
        let mut table = Table::new(vec!["t".into(), "goals".into()]);
        table.push_row(vec![
            CellValue::Text("Netherlands".into()),
            CellValue::Integer(3),
        ]);
        let widths = table.column_widths(40);
        assert_eq!(widths[0], "Netherlands".len());
        assert_eq!(widths[1], "goals".len());
    }
}
