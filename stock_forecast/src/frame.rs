//! Provider-shaped tables and their normalization
//!
//! Providers hand back a [`RawFrame`]: a column header that is either a
//! single row of field names or a two-level `(field, group)` header, a row
//! index that may carry the trading dates, and the column cells.
//!
//! [`normalize`] reduces any such frame to the flat shape the rest of the
//! crate reads: dates materialized as a leading `Date` column and one field
//! name per column.

use crate::data::DATE;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Column labelling scheme of a provider table
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderShape {
    /// One field name per column
    Simple(Vec<String>),
    /// `(field, group)` per column, e.g. `("Close", "AAPL")`
    Compound(Vec<(String, String)>),
}

impl HeaderShape {
    /// Number of labelled columns
    pub fn len(&self) -> usize {
        match self {
            HeaderShape::Simple(fields) => fields.len(),
            HeaderShape::Compound(labels) => labels.len(),
        }
    }

    /// Whether the header labels no columns
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the header has more than one level
    pub fn is_compound(&self) -> bool {
        matches!(self, HeaderShape::Compound(_))
    }

    /// Top-level labels in column order
    pub fn fields(&self) -> Vec<&str> {
        match self {
            HeaderShape::Simple(fields) => fields.iter().map(String::as_str).collect(),
            HeaderShape::Compound(labels) => labels.iter().map(|(field, _)| field.as_str()).collect(),
        }
    }

    /// Reduce the header to a single level by keeping each column's field name
    ///
    /// The grouping level is dropped without looking at its values. Fails
    /// when the remaining names are empty or no longer unique.
    pub fn collapse(self) -> Result<HeaderShape> {
        let fields: Vec<String> = match self {
            HeaderShape::Simple(fields) => fields,
            HeaderShape::Compound(labels) => labels.into_iter().map(|(field, _)| field).collect(),
        };

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if field.trim().is_empty() {
                return Err(ForecastError::MalformedHeader(
                    "column without a field name".to_string(),
                ));
            }
            if !seen.insert(field.as_str()) {
                return Err(ForecastError::MalformedHeader(format!(
                    "field '{}' appears more than once; the table holds several groups",
                    field
                )));
            }
        }

        Ok(HeaderShape::Simple(fields))
    }
}

/// Row labels of a provider table
#[derive(Debug, Clone, PartialEq)]
pub enum RowIndex {
    /// Rows are only numbered; dates, if any, live in a column
    Positional,
    /// Rows are labelled by trading date
    Dates(Vec<NaiveDate>),
}

/// Cells of a single column
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Dates(Vec<NaiveDate>),
    Numbers(Vec<Option<f64>>),
}

impl ColumnData {
    /// Number of cells
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Dates(values) => values.len(),
            ColumnData::Numbers(values) => values.len(),
        }
    }

    /// Whether the column has no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A table as delivered by a market data provider
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    header: HeaderShape,
    index: RowIndex,
    columns: Vec<ColumnData>,
}

impl RawFrame {
    /// Create a frame, checking that header, index and columns line up
    pub fn new(header: HeaderShape, index: RowIndex, columns: Vec<ColumnData>) -> Result<Self> {
        if header.len() != columns.len() {
            return Err(ForecastError::MalformedHeader(format!(
                "header labels {} columns but the table has {}",
                header.len(),
                columns.len()
            )));
        }

        let height = match (&index, columns.first()) {
            (RowIndex::Dates(dates), _) => dates.len(),
            (RowIndex::Positional, Some(column)) => column.len(),
            (RowIndex::Positional, None) => 0,
        };
        if columns.iter().any(|c| c.len() != height) {
            return Err(ForecastError::DataError(
                "columns have different lengths".to_string(),
            ));
        }

        Ok(Self {
            header,
            index,
            columns,
        })
    }

    /// A frame without rows or columns
    pub fn empty() -> Self {
        Self {
            header: HeaderShape::Simple(Vec::new()),
            index: RowIndex::Positional,
            columns: Vec::new(),
        }
    }

    /// Column header
    pub fn header(&self) -> &HeaderShape {
        &self.header
    }

    /// Row index
    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    /// Column cells, in header order
    pub fn columns(&self) -> &[ColumnData] {
        &self.columns
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        match (&self.index, self.columns.first()) {
            (RowIndex::Dates(dates), _) => dates.len(),
            (RowIndex::Positional, Some(column)) => column.len(),
            (RowIndex::Positional, None) => 0,
        }
    }

    /// Whether the frame holds no rows
    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    /// Whether the frame already has the flat, positional shape
    pub fn is_normalized(&self) -> bool {
        matches!(self.index, RowIndex::Positional) && !self.header.is_compound()
    }

    /// Look up a column of a single-level frame by field name
    pub fn column(&self, field: &str) -> Option<&ColumnData> {
        match &self.header {
            HeaderShape::Simple(fields) => fields
                .iter()
                .position(|f| f == field)
                .map(|i| &self.columns[i]),
            HeaderShape::Compound(_) => None,
        }
    }

    /// Move a date row index into a leading `Date` column
    fn materialize_index(self) -> Self {
        let RawFrame {
            header,
            index,
            mut columns,
        } = self;

        let dates = match index {
            RowIndex::Positional => {
                return RawFrame {
                    header,
                    index: RowIndex::Positional,
                    columns,
                }
            }
            RowIndex::Dates(dates) => dates,
        };

        let header = match header {
            HeaderShape::Simple(mut fields) => {
                fields.insert(0, DATE.to_string());
                HeaderShape::Simple(fields)
            }
            HeaderShape::Compound(mut labels) => {
                labels.insert(0, (DATE.to_string(), String::new()));
                HeaderShape::Compound(labels)
            }
        };
        columns.insert(0, ColumnData::Dates(dates));

        RawFrame {
            header,
            index: RowIndex::Positional,
            columns,
        }
    }
}

/// Flatten a provider frame to one header row with dates as a column
///
/// A date row index becomes a leading `Date` column, then a compound header
/// is reduced to its top-level field names. A frame that is already flat
/// comes back unchanged, so applying this twice equals applying it once.
pub fn normalize(frame: RawFrame) -> Result<RawFrame> {
    let frame = frame.materialize_index();
    let header = frame.header.collapse()?;

    Ok(RawFrame {
        header,
        index: frame.index,
        columns: frame.columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn numbers(values: &[f64]) -> ColumnData {
        ColumnData::Numbers(values.iter().copied().map(Some).collect())
    }

    #[test]
    fn test_new_rejects_mismatched_header() {
        let result = RawFrame::new(
            HeaderShape::Simple(vec!["Close".to_string(), "Open".to_string()]),
            RowIndex::Positional,
            vec![numbers(&[1.0])],
        );
        assert!(matches!(result, Err(ForecastError::MalformedHeader(_))));
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let result = RawFrame::new(
            HeaderShape::Simple(vec!["Close".to_string()]),
            RowIndex::Dates(vec![day(1), day(4)]),
            vec![numbers(&[1.0])],
        );
        assert!(matches!(result, Err(ForecastError::DataError(_))));
    }

    #[test]
    fn test_materialize_index_with_simple_header() {
        let frame = RawFrame::new(
            HeaderShape::Simple(vec!["Close".to_string()]),
            RowIndex::Dates(vec![day(1), day(4)]),
            vec![numbers(&[10.0, 11.0])],
        )
        .unwrap();

        let flat = normalize(frame).unwrap();

        assert_eq!(flat.header().fields(), vec!["Date", "Close"]);
        assert_eq!(flat.index(), &RowIndex::Positional);
        assert_eq!(flat.column("Date"), Some(&ColumnData::Dates(vec![day(1), day(4)])));
    }

    #[test]
    fn test_collapse_rejects_several_groups() {
        let header = HeaderShape::Compound(vec![
            ("Close".to_string(), "AAPL".to_string()),
            ("Close".to_string(), "MSFT".to_string()),
        ]);
        assert!(matches!(
            header.collapse(),
            Err(ForecastError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_collapse_rejects_blank_field() {
        let header = HeaderShape::Compound(vec![(" ".to_string(), "AAPL".to_string())]);
        assert!(header.collapse().is_err());
    }

    #[test]
    fn test_column_lookup_requires_flat_header() {
        let frame = RawFrame::new(
            HeaderShape::Compound(vec![("Close".to_string(), "AAPL".to_string())]),
            RowIndex::Positional,
            vec![numbers(&[1.0])],
        )
        .unwrap();

        assert!(frame.column("Close").is_none());
        assert!(!frame.is_normalized());
        assert!(normalize(frame).unwrap().column("Close").is_some());
    }

    #[test]
    fn test_empty_frame() {
        let frame = RawFrame::empty();
        assert!(frame.is_empty());
        assert!(frame.is_normalized());
        assert_eq!(normalize(frame.clone()).unwrap(), frame);
    }
}
