//! Comma-separated text to `Table`, one `RowBuilder` call per record.
//!
//! Fields are split on every comma. Quotes have no special meaning, so a
//! field can never contain the delimiter; sources that rely on quoting are
//! not supported.

use crate::data::row_builder::{Row, RowBuilder};
use crate::data::table::Table;
use crate::error::ParseError;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser {
    has_header: bool,
}

impl CsvParser {
    pub fn new(has_header: bool) -> Self {
        Self { has_header }
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// Parse everything `source` yields. Any builder failure aborts the whole
    /// parse.
    pub fn parse<R: Read, B: RowBuilder>(
        &self,
        source: R,
        builder: &B,
    ) -> Result<Table<B::Output>, ParseError> {
        self.parse_source(source, None, builder)
    }

    /// Open `path` and parse it
    pub fn parse_file<P: AsRef<Path>, B: RowBuilder>(
        &self,
        path: P,
        builder: &B,
    ) -> Result<Table<B::Output>, ParseError> {
        let path = path.as_ref();
        info!("Parsing CSV file: {}", path.display());

        let file = File::open(path).map_err(|e| ParseError::Datasource {
            path: Some(path.to_path_buf()),
            source: e.into(),
        })?;

        self.parse_source(file, Some(path), builder)
    }

    fn parse_source<R: Read, B: RowBuilder>(
        &self,
        source: R,
        path: Option<&Path>,
        builder: &B,
    ) -> Result<Table<B::Output>, ParseError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(source);

        let mut header: Option<Row> = None;
        let mut rows = Vec::new();
        let mut record = csv::StringRecord::new();

        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    return Err(ParseError::Datasource {
                        path: path.map(Path::to_path_buf),
                        source: e,
                    })
                }
            }

            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let fields: Row = record.iter().map(str::to_string).collect();

            if self.has_header && header.is_none() {
                debug!("Header row at line {}: {:?}", line, fields);
                header = Some(fields);
                continue;
            }

            let built = builder
                .build(fields)
                .map_err(|failure| ParseError::Factory { line, failure })?;
            rows.push(built);
        }

        debug!(
            "Parsed {} rows (header: {})",
            rows.len(),
            header.is_some()
        );

        Ok(Table::new(header, rows))
    }
}

/// Parse `source` with `builder`, treating the first record as a header when
/// `has_header` is set
pub fn parse<R: Read, B: RowBuilder>(
    source: R,
    builder: &B,
    has_header: bool,
) -> Result<Table<B::Output>, ParseError> {
    CsvParser::new(has_header).parse(source, builder)
}

pub fn parse_file<P: AsRef<Path>, B: RowBuilder>(
    path: P,
    builder: &B,
    has_header: bool,
) -> Result<Table<B::Output>, ParseError> {
    CsvParser::new(has_header).parse_file(path, builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::row_builder::{IdentityBuilder, StarBuilder};
    use crate::error::FactoryFailure;
    use std::io::Write;

    const CLASS_CSV: &str = "name,class,position\njake,second,right\nalex,first,right";

    fn row(fields: &[&str]) -> Row {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_header_is_split_off() {
        let table = parse(CLASS_CSV.as_bytes(), &IdentityBuilder, true).unwrap();
        assert_eq!(table.header(), Some(&row(&["name", "class", "position"])));
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0], row(&["jake", "second", "right"]));
        assert_eq!(table.rows()[1], row(&["alex", "first", "right"]));
    }

    #[test]
    fn test_without_header_every_record_is_a_row() {
        let table = parse(CLASS_CSV.as_bytes(), &IdentityBuilder, false).unwrap();
        assert!(table.header().is_none());
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows()[0], row(&["name", "class", "position"]));
    }

    #[test]
    fn test_empty_input_is_an_empty_table() {
        let table = parse("".as_bytes(), &IdentityBuilder, true).unwrap();
        assert!(table.header().is_none());
        assert!(table.is_empty());

        let table = parse("".as_bytes(), &IdentityBuilder, false).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_header_only_input() {
        let table = parse("a,b,c\n".as_bytes(), &IdentityBuilder, true).unwrap();
        assert_eq!(table.header(), Some(&row(&["a", "b", "c"])));
        assert!(table.is_empty());
    }

    #[test]
    fn test_crlf_and_ragged_rows() {
        let text = "a,b,c\r\n1,2\r\n3,4,5,6\r\n";
        let table = parse(text.as_bytes(), &IdentityBuilder, false).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows()[1], row(&["1", "2"]));
        assert_eq!(table.rows()[2], row(&["3", "4", "5", "6"]));
    }

    #[test]
    fn test_quotes_are_ordinary_characters() {
        let text = "\"Smith, John\",42";
        let table = parse(text.as_bytes(), &IdentityBuilder, false).unwrap();
        assert_eq!(table.rows()[0], row(&["\"Smith", " John\"", "42"]));
    }

    #[test]
    fn test_empty_fields_are_kept() {
        let table = parse("a,,c\n,,".as_bytes(), &IdentityBuilder, false).unwrap();
        assert_eq!(table.rows()[0], row(&["a", "", "c"]));
        assert_eq!(table.rows()[1], row(&["", "", ""]));
    }

    #[test]
    fn test_builder_failure_aborts_with_line() {
        let text = "StarID,ProperName,X,Y,Z\n0,Sol,0,0,0\n1,Andreas\n2,Rory,43.04,0.00285,-15.24";
        let err = parse(text.as_bytes(), &StarBuilder, true).unwrap_err();
        match err {
            ParseError::Factory { line, failure } => {
                assert_eq!(line, 3);
                assert_eq!(failure.row, row(&["1", "Andreas"]));
            }
            other => panic!("expected factory failure, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_sees_rows_in_order() {
        let first_field = |fields: Row| -> Result<String, FactoryFailure> {
            Ok(fields.into_iter().next().unwrap_or_default())
        };
        let table = parse("x,1\ny,2\nz,3".as_bytes(), &first_field, false).unwrap();
        assert_eq!(table.rows(), &["x", "y", "z"]);
    }

    #[test]
    fn test_parse_file_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", CLASS_CSV).unwrap();

        let table = parse_file(file.path(), &IdentityBuilder, true).unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_missing_file_is_a_datasource_error() {
        let err = CsvParser::new(false)
            .parse_file("no/such/file.csv", &IdentityBuilder)
            .unwrap_err();
        assert!(matches!(err, ParseError::Datasource { .. }));
        assert_eq!(err.to_string(), "error loading file: no/such/file.csv");
    }

    #[test]
    fn test_invalid_utf8_is_a_datasource_error() {
        let bytes: &[u8] = b"ok,fine\n\xff\xfe,bad\n";
        let err = parse(bytes, &IdentityBuilder, false).unwrap_err();
        assert!(matches!(err, ParseError::Datasource { path: None, .. }));
    }
}
