use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Feature row has {columns} column name(s) but {values} value(s)")]
pub struct ShapeMismatch {
    pub columns: usize,
    pub values: usize,
}

/// One record of named features for a single molecule.
///
/// Values are kept as the text the producer wrote, so a row read from the external
/// tool is written back byte-for-byte apart from the appended columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureRow {
    columns: Vec<String>,
    values: Vec<String>,
}

impl FeatureRow {
    pub fn new(columns: Vec<String>, values: Vec<String>) -> Result<Self, ShapeMismatch> {
        if columns.len() != values.len() {
            return Err(ShapeMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the value of the first column called `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i].as_str())
    }

    /// Appends a column at the end of the row.
    pub fn push(&mut self, column: impl Into<String>, value: impl ToString) {
        self.columns.push(column.into());
        self.values.push(value.to_string());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

impl<K: Into<String>, V: ToString> Extend<(K, V)> for FeatureRow {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (column, value) in iter {
            self.push(column, value);
        }
    }
}
