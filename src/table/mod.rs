//! Row-oriented table of scalar cells
//!
//! A small dataframe: named columns (duplicates allowed), an optional named
//! index column, column selection and reordering, grouping by key columns.
//! Conversion to Arrow lives in [`export`].

pub mod export;

use crate::scalar::{PropertyMap, Scalar};
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use std::fmt;

/// Rows sharing the same values in the grouping columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    key: Vec<Scalar>,
    rows: Vec<usize>,
}

impl Group {
    /// Values of the grouping columns, in grouping order.
    #[must_use]
    pub fn key(&self) -> &[Scalar] {
        &self.key
    }

    /// Row positions belonging to the group, in table order.
    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }
}

/// In-memory table with an optional index column.
///
/// The index column is stored alongside the data columns but is not
/// reported by [`Table::columns`]; use [`Table::index`] to read it.
///
/// # Example
///
/// ```rust
/// use bench_overview::{Scalar, Table};
///
/// let mut table = Table::new(vec!["run_id".to_string(), "accuracy".to_string()]);
/// table.push_row(vec![Scalar::from("1"), Scalar::Float(0.8)])?;
/// table.push_row(vec![Scalar::from("2"), Scalar::Float(0.9)])?;
///
/// let table = table.set_index("run_id")?;
/// assert_eq!(table.columns(), vec!["accuracy"]);
/// assert_eq!(table.index_name(), Some("run_id"));
/// # Ok::<(), bench_overview::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    index: Option<usize>,
    rows: Vec<Vec<Scalar>>,
}

impl Table {
    /// Create an empty table with the given columns.
    #[must_use]
    pub const fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            index: None,
            rows: Vec::new(),
        }
    }

    /// Build a table with one row per record.
    ///
    /// Columns appear in order of first occurrence across the records;
    /// cells a record lacks are [`Scalar::Null`].
    #[must_use]
    pub fn from_records(records: &[PropertyMap]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for name in record.keys() {
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|name| record.get(name).cloned().unwrap_or(Scalar::Null))
                    .collect()
            })
            .collect();

        Self {
            columns,
            index: None,
            rows,
        }
    }

    /// Append a row holding one value per column, index included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Table`] if the row length does not match.
    pub fn push_row(&mut self, row: Vec<Scalar>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::Table(format!(
                "Row has {} values, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Get the number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of data columns (the index is not counted).
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len() - usize::from(self.index.is_some())
    }

    /// Check if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the data column names in order.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.data_positions().map(|i| self.columns[i].as_str()).collect()
    }

    /// Get the index column name, if an index is set.
    #[must_use]
    pub fn index_name(&self) -> Option<&str> {
        self.index.map(|i| self.columns[i].as_str())
    }

    /// Get the index values, if an index is set.
    #[must_use]
    pub fn index(&self) -> Option<Vec<&Scalar>> {
        self.index.map(|i| self.rows.iter().map(|row| &row[i]).collect())
    }

    /// Check if a data column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Get the values of a data column (first match by name).
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&Scalar>> {
        self.position(name)
            .map(|i| self.rows.iter().map(|row| &row[i]).collect())
    }

    /// Get a single cell of a data column.
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&Scalar> {
        let i = self.position(column)?;
        self.rows.get(row).map(|values| &values[i])
    }

    /// Append a data column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Table`] if `values` does not have one entry per row.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<Scalar>) -> Result<()> {
        let name = name.into();
        if values.len() != self.rows.len() {
            return Err(Error::Table(format!(
                "Column '{name}' has {} values, table has {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Replace every value of a data column with `f(value)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Table`] if the column does not exist.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> Result<()>
    where
        F: FnMut(&Scalar) -> Scalar,
    {
        let i = self.require(name)?;
        for row in &mut self.rows {
            row[i] = f(&row[i]);
        }
        Ok(())
    }

    /// Remove a data column (first match by name).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Table`] if the column does not exist.
    pub fn drop_column(&mut self, name: &str) -> Result<()> {
        let i = self.require(name)?;
        self.columns.remove(i);
        for row in &mut self.rows {
            row.remove(i);
        }
        if let Some(index) = self.index.as_mut() {
            if *index > i {
                *index -= 1;
            }
        }
        Ok(())
    }

    /// Build a table with the given data columns in the given order.
    ///
    /// A name may be listed more than once. The index is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Table`] if a column does not exist.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut positions = Vec::with_capacity(names.len() + 1);
        positions.extend(self.index);
        for name in names {
            positions.push(self.require(name.as_ref())?);
        }

        Ok(Self {
            columns: positions.iter().map(|&i| self.columns[i].clone()).collect(),
            index: self.index.map(|_| 0),
            rows: self
                .rows
                .iter()
                .map(|row| positions.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        })
    }

    /// Use a data column as the index, discarding any previous index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Table`] if the column does not exist.
    pub fn set_index(mut self, name: &str) -> Result<Self> {
        if self.index_name() == Some(name) {
            return Ok(self);
        }
        let mut i = self.require(name)?;
        if let Some(old) = self.index.take() {
            self.columns.remove(old);
            for row in &mut self.rows {
                row.remove(old);
            }
            if i > old {
                i -= 1;
            }
        }
        self.index = Some(i);
        Ok(self)
    }

    /// Group rows by the values of the given columns.
    ///
    /// Key columns may include the index. Groups are returned in ascending
    /// key order; [`Scalar::Null`] is an ordinary key value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Table`] if a key column does not exist.
    pub fn group_by<S: AsRef<str>>(&self, keys: &[S]) -> Result<Vec<Group>> {
        let positions = keys
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.position(name)
                    .or_else(|| self.index.filter(|&i| self.columns[i] == name))
                    .ok_or_else(|| Error::Table(format!("Group key column '{name}' not found")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut lookup: FxHashMap<Vec<Scalar>, usize> = FxHashMap::default();
        let mut groups: Vec<Group> = Vec::new();
        for (row_index, row) in self.rows.iter().enumerate() {
            let key: Vec<Scalar> = positions.iter().map(|&i| row[i].clone()).collect();
            let group = *lookup.entry(key.clone()).or_insert_with(|| {
                groups.push(Group {
                    key,
                    rows: Vec::new(),
                });
                groups.len() - 1
            });
            groups[group].rows.push(row_index);
        }

        groups.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(groups)
    }

    fn data_positions(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.columns.len()).filter(move |&i| Some(i) != self.index)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.data_positions().find(|&i| self.columns[i] == name)
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| Error::Table(format!("Column '{name}' not found")))
    }

    /// Column positions in display order: index first.
    fn display_positions(&self) -> Vec<usize> {
        self.index.into_iter().chain(self.data_positions()).collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let positions = self.display_positions();
        if positions.is_empty() {
            return writeln!(f, "Empty table ({} rows)", self.rows.len());
        }

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| positions.iter().map(|&i| row[i].to_string()).collect())
            .collect();
        let widths: Vec<usize> = positions
            .iter()
            .enumerate()
            .map(|(c, &i)| {
                cells
                    .iter()
                    .map(|row| row[c].chars().count())
                    .chain(std::iter::once(self.columns[i].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<&str> = positions.iter().map(|&i| self.columns[i].as_str()).collect();
        write_line(f, &header, &widths)?;
        for row in &cells {
            let row: Vec<&str> = row.iter().map(String::as_str).collect();
            write_line(f, &row, &widths)?;
        }
        Ok(())
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[&str], widths: &[usize]) -> fmt::Result {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(f, "{}", line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec!["t".to_string(), "name".to_string(), "score".to_string()]);
        table
            .push_row(vec![Scalar::Integer(2), Scalar::from("b"), Scalar::Float(0.5)])
            .unwrap();
        table
            .push_row(vec![Scalar::Integer(1), Scalar::from("a"), Scalar::Float(0.7)])
            .unwrap();
        table
            .push_row(vec![Scalar::Integer(2), Scalar::from("b"), Scalar::Float(0.9)])
            .unwrap();
        table
    }

    #[test]
    fn test_from_records_fills_missing_cells() {
        let a = PropertyMap::from([("x".to_string(), Scalar::Integer(1))]);
        let b = PropertyMap::from([("y".to_string(), Scalar::Integer(2))]);
        let table = Table::from_records(&[a, b]);

        assert_eq!(table.columns(), vec!["x", "y"]);
        assert_eq!(table.value(0, "y"), Some(&Scalar::Null));
        assert_eq!(table.value(1, "y"), Some(&Scalar::Integer(2)));
    }

    #[test]
    fn test_push_row_shape_mismatch() {
        let mut table = Table::new(vec!["a".to_string()]);
        let err = table.push_row(vec![]).unwrap_err();
        assert!(matches!(err, Error::Table(_)));
    }

    #[test]
    fn test_select_reorders_and_keeps_index() {
        let table = sample().set_index("t").unwrap();
        let selected = table.select(&["score", "name", "score"]).unwrap();

        assert_eq!(selected.columns(), vec!["score", "name", "score"]);
        assert_eq!(selected.index_name(), Some("t"));
        assert_eq!(selected.num_columns(), 3);
        assert!(table.select(&["missing"]).is_err());
    }

    #[test]
    fn test_set_index_replaces_previous_index() {
        let table = sample().set_index("t").unwrap().set_index("name").unwrap();
        assert_eq!(table.index_name(), Some("name"));
        assert_eq!(table.columns(), vec!["score"]);
        assert_eq!(
            table.index().unwrap(),
            vec![&Scalar::from("b"), &Scalar::from("a"), &Scalar::from("b")]
        );
    }

    #[test]
    fn test_drop_column_adjusts_index() {
        let mut table = sample().set_index("score").unwrap();
        table.drop_column("t").unwrap();
        assert_eq!(table.index_name(), Some("score"));
        assert_eq!(table.columns(), vec!["name"]);
        assert!(table.drop_column("score").is_err());
    }

    #[test]
    fn test_group_by_sorted_keys() {
        let table = sample().set_index("t").unwrap();
        let groups = table.group_by(&["t", "name"]).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key(), &[Scalar::Integer(1), Scalar::from("a")]);
        assert_eq!(groups[0].rows(), &[1]);
        assert_eq!(groups[1].key(), &[Scalar::Integer(2), Scalar::from("b")]);
        assert_eq!(groups[1].rows(), &[0, 2]);
    }

    #[test]
    fn test_group_by_missing_column() {
        let err = sample().group_by(&["nope"]).unwrap_err();
        assert!(matches!(err, Error::Table(_)));
    }

    #[test]
    fn test_map_column() {
        let mut table = sample();
        table
            .map_column("name", |v| Scalar::from(v.to_string().to_uppercase()))
            .unwrap();
        assert_eq!(table.value(1, "name"), Some(&Scalar::from("A")));
    }

    #[test]
    fn test_display() {
        let table = sample().set_index("t").unwrap();
        let rendered = table.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "t  name  score");
        assert_eq!(lines[1], "2  b     0.5");
        assert_eq!(Table::default().to_string(), "Empty table (0 rows)\n");
    }
}
