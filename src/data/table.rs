use crate::data::row_builder::Row;

/// The output of one load: built rows in source order plus the header
/// record, if the source declared one.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T = Row> {
    header: Option<Row>,
    rows: Vec<T>,
}

impl<T> Table<T> {
    pub fn new(header: Option<Row>, rows: Vec<T>) -> Self {
        Self { header, rows }
    }

    pub fn empty() -> Self {
        Self {
            header: None,
            rows: Vec::new(),
        }
    }

    pub fn header(&self) -> Option<&Row> {
        self.header.as_ref()
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Option<Row>, Vec<T>) {
        (self.header, self.rows)
    }
}

impl<T: AsRef<[String]>> Table<T> {
    /// Header (if any) followed by every row, as plain string records
    pub fn to_records(&self) -> Vec<Row> {
        let mut records = Vec::with_capacity(self.rows.len() + 1);
        if let Some(header) = &self.header {
            records.push(header.clone());
        }
        records.extend(self.rows.iter().map(|r| r.as_ref().to_vec()));
        records
    }
}
