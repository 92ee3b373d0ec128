use crate::data::dataset::Dataset;
use crate::error::SearchError;
use tracing::debug;

const INDEX_PREFIX: &str = "ind:";

/// Which columns a search looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narrowing {
    All,
    ByIndex(usize),
    ByName(String),
}

impl Narrowing {
    /// `ind:N` selects column N (zero based); any other non-empty value names
    /// a header column.
    pub fn parse(raw: Option<&str>) -> Result<Self, SearchError> {
        let raw = match raw {
            None => return Ok(Narrowing::All),
            Some(s) if s.is_empty() => return Ok(Narrowing::All),
            Some(s) => s,
        };

        match raw.strip_prefix(INDEX_PREFIX) {
            Some(index) => index
                .trim()
                .parse::<usize>()
                .map(Narrowing::ByIndex)
                .map_err(|_| {
                    SearchError::bad_request("narrow", format!("'{}' is not a column index", index))
                }),
            None => Ok(Narrowing::ByName(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub needle: String,
    pub has_header: bool,
    pub narrowing: Narrowing,
    /// The narrowing as the caller wrote it, echoed back on a miss
    pub specifier: Option<String>,
}

impl SearchQuery {
    pub fn new(needle: impl Into<String>, has_header: bool) -> Self {
        Self {
            needle: needle.into(),
            has_header,
            narrowing: Narrowing::All,
            specifier: None,
        }
    }

    /// Parse and attach a raw `narrow` argument
    pub fn with_specifier(mut self, raw: Option<&str>) -> Result<Self, SearchError> {
        self.narrowing = Narrowing::parse(raw)?;
        self.specifier = raw.filter(|s| !s.is_empty()).map(str::to_string);
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<T> {
    Found(Vec<T>),
    NoMatch {
        needle: String,
        specifier: Option<String>,
    },
}

impl<T> SearchOutcome<T> {
    pub fn matches(&self) -> &[T] {
        match self {
            SearchOutcome::Found(rows) => rows,
            SearchOutcome::NoMatch { .. } => &[],
        }
    }
}

/// Column selection after the narrowing has been checked against the header
enum Columns {
    All,
    Only(usize),
}

pub struct SearchEngine;

impl SearchEngine {
    /// Every row (in source order) with a candidate field equal to the needle.
    ///
    /// When the table was loaded without a header but the query says it has
    /// one, the first row is taken as the header and is not searched.
    pub fn search<T>(
        dataset: &Dataset<T>,
        query: &SearchQuery,
    ) -> Result<SearchOutcome<T>, SearchError>
    where
        T: AsRef<[String]> + Clone,
    {
        let table = dataset.snapshot().ok_or(SearchError::NoDataLoaded)?;

        let (header, rows): (Option<&[String]>, &[T]) = match table.header() {
            Some(header) => (Some(header.as_slice()), table.rows()),
            None if query.has_header => match table.rows().split_first() {
                Some((first, rest)) => (Some(first.as_ref()), rest),
                None => (None, table.rows()),
            },
            None => (None, table.rows()),
        };

        let columns = Self::resolve_columns(&query.narrowing, header)?;

        let found: Vec<T> = rows
            .iter()
            .filter(|row| Self::row_matches(row.as_ref(), &columns, &query.needle))
            .cloned()
            .collect();

        debug!(
            "Search '{}' ({:?}) matched {} of {} rows",
            query.needle,
            query.narrowing,
            found.len(),
            rows.len()
        );

        if found.is_empty() {
            Ok(SearchOutcome::NoMatch {
                needle: query.needle.clone(),
                specifier: query.specifier.clone(),
            })
        } else {
            Ok(SearchOutcome::Found(found))
        }
    }

    fn resolve_columns(
        narrowing: &Narrowing,
        header: Option<&[String]>,
    ) -> Result<Columns, SearchError> {
        match narrowing {
            Narrowing::All => Ok(Columns::All),
            Narrowing::ByIndex(index) => Ok(Columns::Only(*index)),
            Narrowing::ByName(name) => {
                let header = header.ok_or_else(|| {
                    SearchError::bad_request(
                        "narrow",
                        format!("cannot narrow by column name '{}' without a header", name),
                    )
                })?;
                header
                    .iter()
                    .position(|column| column == name)
                    .map(Columns::Only)
                    .ok_or_else(|| {
                        SearchError::bad_request(
                            "narrow",
                            format!("no column named '{}' in the header", name),
                        )
                    })
            }
        }
    }

    fn row_matches(fields: &[String], columns: &Columns, needle: &str) -> bool {
        match columns {
            Columns::All => fields.iter().any(|field| field == needle),
            Columns::Only(index) => fields.get(*index).is_some_and(|field| field == needle),
        }
    }
}
