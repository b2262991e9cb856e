use serde_json::{Map, Value};

/// A rectangular table of JSON cells with named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from keyed records.
    ///
    /// Columns are the union of all record keys in first-seen order; cells a
    /// record does not provide are null.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut table = Table::default();
        for record in &records {
            for key in record.keys() {
                if !table.columns.contains(key) {
                    table.columns.push(key.clone());
                }
            }
        }
        for mut record in records {
            let row = table
                .columns
                .iter()
                .map(|c| record.remove(c).unwrap_or(Value::Null))
                .collect();
            table.rows.push(row);
        }
        table
    }

    /// Append a row; short rows are padded with nulls, long ones truncated.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let c = self.columns.iter().position(|name| name == column)?;
        self.rows.get(row).and_then(|r| r.get(c))
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_objects(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }
}

/// Text of a cell as it appears in flat formats: strings unquoted, null
/// empty, everything else compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
