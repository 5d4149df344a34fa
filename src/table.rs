//! Plain-text tables for command output.
//!
//! Tables use ASCII borders and no cell padding so they stay narrow inside
//! Discord code blocks.

use std::fmt;

use comfy_table::Table as ComfyTable;

/// ASCII outer border and header rule, no separators between body rows.
const ASCII_COMPACT: &str = "||--+-++|    ++++++";

/// Render `headers` and `rows` into a bordered table.
///
/// Rows shorter than the header are padded with empty cells.
pub fn render<S, R>(headers: &[S], rows: &[R]) -> String
where
    S: AsRef<str>,
    R: AsRef<[S]>,
{
    let mut table = ComfyTable::new();
    table.load_preset(ASCII_COMPACT);

    if !headers.is_empty() {
        table.set_header(headers.iter().map(<S as AsRef<str>>::as_ref));
    }
    for row in rows {
        let cells = <R as AsRef<[S]>>::as_ref(row);
        table.add_row(cells.iter().map(<S as AsRef<str>>::as_ref));
    }
    for column in table.column_iter_mut() {
        column.set_padding((0, 0));
    }

    table.to_string()
}

/// Wrap text in a fenced code block so Discord keeps it monospaced.
#[must_use]
pub fn code_block(text: &str) -> String {
    format!("```\n{text}\n```")
}

/// Table assembled piece by piece.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn rows<I, R, S>(self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        rows.into_iter().fold(self, Table::row)
    }

    #[must_use]
    pub fn render(&self) -> String {
        render(&self.headers, &self.rows)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A value that renders as one table row.
pub trait TableRow {
    fn headers() -> Vec<String>;
    fn cells(&self) -> Vec<String>;
}

/// Typed rows sharing one header.
#[derive(Debug, Clone)]
pub struct Data<T> {
    headers: Vec<String>,
    data: Vec<T>,
}

impl<T: TableRow> Data<T> {
    #[must_use]
    pub fn new(data: Vec<T>) -> Self {
        Self {
            headers: T::headers(),
            data,
        }
    }

    pub fn push(&mut self, row: T) {
        self.data.push(row);
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.data.len()
    }

    /// Number of columns, taken from the header.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.headers.len()
    }

    /// Cell text at `row`, `col`, if both are in range.
    #[must_use]
    pub fn at(&self, row: usize, col: usize) -> Option<String> {
        if col >= self.columns() {
            return None;
        }
        self.data
            .get(row)
            .and_then(|value| value.cells().into_iter().nth(col))
    }

    #[must_use]
    pub fn render(&self) -> String {
        let rows: Vec<Vec<String>> = self.data.iter().map(TableRow::cells).collect();
        render(&self.headers, &rows)
    }
}

impl<T: TableRow> FromIterator<T> for Data<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
