//! The unemployment reference table.
//!
//! Loads the annual-average unemployment rate per year from the monthly
//! reference CSV. The table is orders of magnitude smaller than the main
//! dataset and is held fully in memory, which is what makes the map-side
//! join of Stage 3 possible.

use listenomics_common::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Mapping of year to annual-average unemployment rate.
///
/// Rows of the source are `year,m1,...,m12`; the average covers only the
/// non-empty month fields, so partial years still produce a rate. Years
/// absent from the source have no entry.
#[derive(Debug, Clone, Default)]
pub struct UnemploymentTable {
    rates: HashMap<i32, f64>,
}

impl UnemploymentTable {
    /// Load the table from a reference CSV file. An unreadable file is a
    /// fatal error; malformed rows inside a readable file are skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::io_error_with_source(
                format!("failed to open unemployment data at {}", path.display()),
                e,
            )
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse the table from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut rates = HashMap::new();

        for line in reader.lines() {
            let line = line.map_err(|e| {
                Error::io_error_with_source("failed to read unemployment data", e)
            })?;
            if let Some((year, rate)) = Self::parse_row(&line) {
                rates.insert(year, rate);
            }
        }

        Ok(Self { rates })
    }

    /// Build a table directly from (year, rate) entries.
    pub fn from_rates(entries: impl IntoIterator<Item = (i32, f64)>) -> Self {
        Self {
            rates: entries.into_iter().collect(),
        }
    }

    // One CSV row -> (year, annual average). Any unparsable number drops
    // the whole row.
    fn parse_row(line: &str) -> Option<(i32, f64)> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 13 {
            return None;
        }

        let year: i32 = parts[0].trim().parse().ok()?;

        let mut sum = 0.0;
        let mut count = 0u32;
        for month in &parts[1..=12] {
            let month = month.trim();
            if month.is_empty() {
                continue;
            }
            sum += month.parse::<f64>().ok()?;
            count += 1;
        }

        if count == 0 {
            return None;
        }

        Some((year, sum / count as f64))
    }

    /// Annual average rate for a year, if the reference data covers it.
    pub fn rate(&self, year: i32) -> Option<f64> {
        self.rates.get(&year).copied()
    }

    /// Number of years covered.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn load(data: &str) -> UnemploymentTable {
        UnemploymentTable::from_reader(Cursor::new(data.to_string())).unwrap()
    }

    #[test]
    fn test_full_year_average() {
        let table = load("1990,5.4,5.3,5.2,5.4,5.4,5.2,5.5,5.7,5.9,5.9,6.2,6.3\n");
        let rate = table.rate(1990).unwrap();
        assert!((rate - 5.616666666666666).abs() < 1e-9);
    }

    #[test]
    fn test_partial_year_averages_only_present_months() {
        // Only two non-empty months: (3.0 + 5.0) / 2
        let table = load("1955,3.0,,5.0,,,,,,,,,\n");
        assert_eq!(table.rate(1955), Some(4.0));
    }

    #[test]
    fn test_short_rows_and_comments_skipped() {
        let table = load("# source: monthly reference series\n1990,5.0,5.0\n\n1991,6.0,6.0,6.0,6.0,6.0,6.0,6.0,6.0,6.0,6.0,6.0,6.0\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rate(1991), Some(6.0));
        assert_eq!(table.rate(1990), None);
    }

    #[test]
    fn test_bad_month_drops_whole_row() {
        let table = load("1992,4.0,oops,4.0,,,,,,,,,\n");
        assert!(table.is_empty());
    }

    #[test]
    fn test_all_months_empty_skipped() {
        let table = load("1993,,,,,,,,,,,,\n");
        assert_eq!(table.rate(1993), None);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = UnemploymentTable::load("/nonexistent/unemployment.txt");
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_from_rates() {
        let table = UnemploymentTable::from_rates([(1950, 3.0), (1951, 4.0)]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rate(1950), Some(3.0));
    }
}
