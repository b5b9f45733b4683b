// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory tabular value passed between units.
//!
//! A [`Table`] wraps an arrow [`RecordBatch`] whose columns are restricted
//! to the six [`DataType`]s definitions can name. Every way into a table
//! (typed constructors, [`Column::new`], [`Table::from_batch`]) normalizes
//! arrow types onto that set, so a column's declared type and the values it
//! holds can never disagree.
//!
//! The composition layer never looks inside a table; only units do. Units
//! receive tables by reference and return new ones, so a value handed to
//! several units (fan-out, gather) is never mutated behind anyone's back.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Date32Array, Float64Array, Int64Array, Scalar,
    StringArray, TimestampMicrosecondArray, UInt32Array,
};
use arrow::compute::kernels::boolean::is_not_null;
use arrow::compute::kernels::zip::zip;
use arrow::compute::{cast_with_options, concat_batches, take, CastOptions};
use arrow::datatypes::{
    DataType as ArrowType, Date32Type, Field, Float64Type, Int64Type, Schema, TimeUnit,
    TimestampMicrosecondType,
};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use arrow::row::{Row, RowConverter, SortField};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::errors::{UnitError, UnitResult};

/// Column element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Int64,
    Float64,
    Utf8,
    Boolean,
    /// Calendar date (arrow `Date32`).
    Date,
    /// Naive timestamp with microsecond precision.
    Datetime,
}

impl DataType {
    /// The arrow type columns of this type are stored as.
    pub fn arrow(self) -> ArrowType {
        match self {
            DataType::Int64 => ArrowType::Int64,
            DataType::Float64 => ArrowType::Float64,
            DataType::Utf8 => ArrowType::Utf8,
            DataType::Boolean => ArrowType::Boolean,
            DataType::Date => ArrowType::Date32,
            DataType::Datetime => ArrowType::Timestamp(TimeUnit::Microsecond, None),
        }
    }

    /// The table type an arrow type is normalized onto. Integers widen to
    /// Int64, floats to Float64; all-null columns are read as Utf8.
    pub fn from_arrow(arrow: &ArrowType) -> Option<DataType> {
        match arrow {
            ArrowType::Int8
            | ArrowType::Int16
            | ArrowType::Int32
            | ArrowType::Int64
            | ArrowType::UInt8
            | ArrowType::UInt16
            | ArrowType::UInt32
            | ArrowType::UInt64 => Some(DataType::Int64),
            ArrowType::Float16 | ArrowType::Float32 | ArrowType::Float64 => Some(DataType::Float64),
            ArrowType::Utf8 | ArrowType::LargeUtf8 | ArrowType::Null => Some(DataType::Utf8),
            ArrowType::Boolean => Some(DataType::Boolean),
            ArrowType::Date32 | ArrowType::Date64 => Some(DataType::Date),
            ArrowType::Timestamp(_, _) => Some(DataType::Datetime),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int64 => "int64",
            DataType::Float64 => "float64",
            DataType::Utf8 => "utf8",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
            DataType::Datetime => "datetime",
        };
        f.write_str(name)
    }
}

/// A single cell, as read out of a column or written in a definition.
///
/// Definitions can only spell the scalar variants; dates reach a column
/// through [`Column::cast`] or the date units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    #[serde(skip)]
    Date(NaiveDate),
    #[serde(skip)]
    Datetime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The type this value naturally belongs to; `None` for nulls.
    pub fn dtype(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DataType::Boolean),
            Value::Int(_) => Some(DataType::Int64),
            Value::Float(_) => Some(DataType::Float64),
            Value::Str(_) => Some(DataType::Utf8),
            Value::Date(_) => Some(DataType::Date),
            Value::Datetime(_) => Some(DataType::Datetime),
        }
    }

    /// Strict conversion of one cell, by the rules of [`Column::cast`].
    pub fn cast(&self, dtype: DataType) -> UnitResult<Value> {
        let Some(own) = self.dtype() else {
            return Ok(Value::Null);
        };
        Ok(Column::from_values("value", own, std::slice::from_ref(self))?
            .cast(dtype)?
            .value(0))
    }

    fn type_name(&self) -> String {
        self.dtype().map_or_else(|| "null".to_string(), |d| d.to_string())
    }

    /// Cell `row` of an array already normalized to `dtype`.
    fn from_array(array: &ArrayRef, dtype: DataType, row: usize) -> Value {
        if array.is_null(row) {
            return Value::Null;
        }
        match dtype {
            DataType::Int64 => Value::Int(array.as_primitive::<Int64Type>().value(row)),
            DataType::Float64 => Value::Float(array.as_primitive::<Float64Type>().value(row)),
            DataType::Utf8 => Value::Str(array.as_string::<i32>().value(row).to_string()),
            DataType::Boolean => Value::Bool(array.as_boolean().value(row)),
            DataType::Date => array
                .as_primitive::<Date32Type>()
                .value_as_date(row)
                .map_or(Value::Null, Value::Date),
            DataType::Datetime => array
                .as_primitive::<TimestampMicrosecondType>()
                .value_as_datetime(row)
                .map_or(Value::Null, Value::Datetime),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d),
            Value::Datetime(t) => write!(f, "{}", t),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Datetime(v)
    }
}

fn strict() -> CastOptions<'static> {
    CastOptions {
        safe: false,
        ..Default::default()
    }
}

pub(crate) fn days_since_epoch(date: NaiveDate) -> i32 {
    date.signed_duration_since(DateTime::UNIX_EPOCH.date_naive())
        .num_days() as i32
}

pub(crate) fn micros_since_epoch(datetime: NaiveDateTime) -> i64 {
    datetime.and_utc().timestamp_micros()
}

/// A named, typed column backed by an arrow array.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    dtype: DataType,
    array: ArrayRef,
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.dtype == other.dtype && self.array.as_ref() == other.array.as_ref()
    }
}

impl Column {
    /// Wrap an arrow array, casting it onto the matching [`DataType`].
    /// Arrays of types outside that set are rejected.
    pub fn new(name: impl Into<String>, array: ArrayRef) -> UnitResult<Self> {
        let name = name.into();
        let Some(dtype) = DataType::from_arrow(array.data_type()) else {
            return Err(UnitError::ColumnType {
                column: name,
                expected: "int64, float64, utf8, boolean, date or datetime".to_string(),
                found: array.data_type().to_string(),
            });
        };
        let array = if array.data_type() == &dtype.arrow() {
            array
        } else {
            cast_with_options(array.as_ref(), &dtype.arrow(), &strict()).map_err(|e| UnitError::Cast {
                column: name.clone(),
                dtype: dtype.to_string(),
                reason: e.to_string(),
            })?
        };
        Ok(Self { name, dtype, array })
    }

    fn typed(name: impl Into<String>, dtype: DataType, array: ArrayRef) -> Self {
        Self {
            name: name.into(),
            dtype,
            array,
        }
    }

    pub fn int64(name: impl Into<String>, values: impl IntoIterator<Item = Option<i64>>) -> Self {
        let array: Int64Array = values.into_iter().collect();
        Self::typed(name, DataType::Int64, Arc::new(array))
    }

    pub fn float64(name: impl Into<String>, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let array: Float64Array = values.into_iter().collect();
        Self::typed(name, DataType::Float64, Arc::new(array))
    }

    pub fn utf8<S: AsRef<str>>(name: impl Into<String>, values: impl IntoIterator<Item = Option<S>>) -> Self {
        let array: StringArray = values.into_iter().collect();
        Self::typed(name, DataType::Utf8, Arc::new(array))
    }

    pub fn boolean(name: impl Into<String>, values: impl IntoIterator<Item = Option<bool>>) -> Self {
        let array: BooleanArray = values.into_iter().collect();
        Self::typed(name, DataType::Boolean, Arc::new(array))
    }

    pub fn date(name: impl Into<String>, values: impl IntoIterator<Item = Option<NaiveDate>>) -> Self {
        let array: Date32Array = values.into_iter().map(|d| d.map(days_since_epoch)).collect();
        Self::typed(name, DataType::Date, Arc::new(array))
    }

    pub fn datetime(
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<NaiveDateTime>>,
    ) -> Self {
        let array: TimestampMicrosecondArray =
            values.into_iter().map(|t| t.map(micros_since_epoch)).collect();
        Self::typed(name, DataType::Datetime, Arc::new(array))
    }

    /// Build a column of `dtype` from cells. Every non-null cell must
    /// already be of `dtype`; nothing is coerced.
    pub fn from_values(name: impl Into<String>, dtype: DataType, values: &[Value]) -> UnitResult<Self> {
        let name = name.into();
        let mismatch = |value: &Value| UnitError::ColumnType {
            column: name.clone(),
            expected: dtype.to_string(),
            found: value.type_name(),
        };
        let array: ArrayRef = match dtype {
            DataType::Int64 => Arc::new(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Null => Ok(None),
                        Value::Int(n) => Ok(Some(*n)),
                        other => Err(mismatch(other)),
                    })
                    .collect::<UnitResult<Int64Array>>()?,
            ),
            DataType::Float64 => Arc::new(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Null => Ok(None),
                        Value::Float(x) => Ok(Some(*x)),
                        other => Err(mismatch(other)),
                    })
                    .collect::<UnitResult<Float64Array>>()?,
            ),
            DataType::Utf8 => Arc::new(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Null => Ok(None),
                        Value::Str(s) => Ok(Some(s.as_str())),
                        other => Err(mismatch(other)),
                    })
                    .collect::<UnitResult<StringArray>>()?,
            ),
            DataType::Boolean => Arc::new(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Null => Ok(None),
                        Value::Bool(b) => Ok(Some(*b)),
                        other => Err(mismatch(other)),
                    })
                    .collect::<UnitResult<BooleanArray>>()?,
            ),
            DataType::Date => Arc::new(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Null => Ok(None),
                        Value::Date(d) => Ok(Some(days_since_epoch(*d))),
                        other => Err(mismatch(other)),
                    })
                    .collect::<UnitResult<Date32Array>>()?,
            ),
            DataType::Datetime => Arc::new(
                values
                    .iter()
                    .map(|v| match v {
                        Value::Null => Ok(None),
                        Value::Datetime(t) => Ok(Some(micros_since_epoch(*t))),
                        other => Err(mismatch(other)),
                    })
                    .collect::<UnitResult<TimestampMicrosecondArray>>()?,
            ),
        };
        Ok(Self::typed(name, dtype, array))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    pub fn array(&self) -> &ArrayRef {
        &self.array
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.array.null_count()
    }

    /// Cell at `row`; `Null` past the end.
    pub fn value(&self, row: usize) -> Value {
        if row >= self.len() {
            return Value::Null;
        }
        Value::from_array(&self.array, self.dtype, row)
    }

    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).map(|row| self.value(row)).collect()
    }

    /// Same data under another name.
    pub fn renamed(&self, name: impl Into<String>) -> Column {
        Self::typed(name, self.dtype, self.array.clone())
    }

    /// Strict conversion to `dtype`.
    ///
    /// Text is trimmed first and blank text becomes null. Every other value
    /// must be representable in the target type: unparsable text, floats
    /// with a fractional part or outside the Int64 range fail with
    /// [`UnitError::Cast`] rather than turning into nulls or clamping.
    pub fn cast(&self, dtype: DataType) -> UnitResult<Column> {
        if self.dtype == dtype {
            return Ok(self.clone());
        }
        let cast_error = |reason: String| UnitError::Cast {
            column: self.name.clone(),
            dtype: dtype.to_string(),
            reason,
        };

        let source: ArrayRef = match self.array.as_string_opt::<i32>() {
            Some(text) => Arc::new(
                text.iter()
                    .map(|v| v.map(str::trim).filter(|s| !s.is_empty()))
                    .collect::<StringArray>(),
            ),
            None => self.array.clone(),
        };
        if let (Some(floats), DataType::Int64) = (source.as_primitive_opt::<Float64Type>(), dtype) {
            if let Some(x) = floats.iter().flatten().find(|x| x.is_finite() && x.fract() != 0.0) {
                return Err(cast_error(format!("{} has a fractional part", x)));
            }
        }

        let array = cast_with_options(source.as_ref(), &dtype.arrow(), &strict())
            .map_err(|e| cast_error(e.to_string()))?;
        Ok(Self::typed(self.name.clone(), dtype, array))
    }

    /// Replace nulls with `fill`, cast to this column's type first
    /// (a fill of `0` for a float column becomes `0.0`).
    pub fn fill_nulls(&self, fill: &Value) -> UnitResult<Column> {
        let Some(fill_dtype) = fill.dtype() else {
            return Ok(self.clone());
        };
        if self.null_count() == 0 {
            return Ok(self.clone());
        }
        let fill = Column::from_values(self.name.clone(), fill_dtype, std::slice::from_ref(fill))?
            .cast(self.dtype)?;
        let present = is_not_null(self.array.as_ref())?;
        let array = zip(&present, &self.array, &Scalar::new(fill.array))?;
        Ok(Self::typed(self.name.clone(), self.dtype, array))
    }
}

/// How two tables are joined on a key column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Outer,
}

impl FromStr for JoinKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inner" => Ok(JoinKind::Inner),
            "left" => Ok(JoinKind::Left),
            "right" => Ok(JoinKind::Right),
            "outer" => Ok(JoinKind::Outer),
            other => Err(format!(
                "Unsupported join type '{}'. Supported types: inner, outer, left, right.",
                other
            )),
        }
    }
}

/// Rows x named, typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    batch: RecordBatch,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            batch: RecordBatch::new_empty(Arc::new(Schema::empty())),
        }
    }
}

impl Table {
    /// Build a table, rejecting ragged columns and duplicate names.
    pub fn new(columns: Vec<Column>) -> UnitResult<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(UnitError::InvalidTable(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        let rows = columns.first().map_or(0, Column::len);
        if let Some(ragged) = columns.iter().find(|c| c.len() != rows) {
            return Err(UnitError::InvalidTable(format!(
                "column '{}' has {} rows but '{}' has {}",
                ragged.name,
                ragged.len(),
                columns[0].name,
                rows
            )));
        }

        let fields: Vec<Field> = columns
            .iter()
            .map(|c| Field::new(c.name.as_str(), c.dtype.arrow(), true))
            .collect();
        let arrays = columns.into_iter().map(|c| c.array).collect();
        let options = RecordBatchOptions::new().with_row_count(Some(rows));
        let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
        Ok(Self { batch })
    }

    /// Adopt a batch produced by a reader, normalizing every column type.
    pub fn from_batch(batch: RecordBatch) -> UnitResult<Self> {
        let schema = batch.schema();
        let columns = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, array)| Column::new(field.name().as_str(), array.clone()))
            .collect::<UnitResult<Vec<_>>>()?;
        Table::new(columns)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn height(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn width(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn columns(&self) -> Vec<Column> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .zip(self.batch.columns())
            .filter_map(|(field, array)| {
                DataType::from_arrow(field.data_type())
                    .map(|dtype| Column::typed(field.name().as_str(), dtype, array.clone()))
            })
            .collect()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        let (_, field) = self.batch.schema_ref().column_with_name(name)?;
        let dtype = DataType::from_arrow(field.data_type())?;
        let array = self.batch.column_by_name(name)?;
        Some(Column::typed(name, dtype, array.clone()))
    }

    /// Column lookup that reports the missing name as a unit failure.
    pub fn require_column(&self, name: &str) -> UnitResult<Column> {
        self.column(name).ok_or_else(|| UnitError::ColumnNotFound {
            column: name.to_string(),
        })
    }

    /// One row as cells, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<Value>> {
        if index >= self.height() {
            return None;
        }
        Some(self.columns().iter().map(|c| c.value(index)).collect())
    }

    /// Replace the column with the same name, or append it.
    pub fn with_column(&self, column: Column) -> UnitResult<Table> {
        let mut columns = self.columns();
        match columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => columns.push(column),
        }
        Table::new(columns)
    }

    /// Drop the named column; a missing name is a `ColumnNotFound`.
    pub fn without_column(&self, name: &str) -> UnitResult<Table> {
        self.require_column(name)?;
        Table::new(self.columns().into_iter().filter(|c| c.name != name).collect())
    }

    /// Vertical concatenation. Every table must share the first table's
    /// column names and types, in the same order.
    pub fn vstack(tables: &[Table]) -> UnitResult<Table> {
        let Some(first) = tables.first() else {
            return Ok(Table::empty());
        };
        for (index, table) in tables.iter().enumerate().skip(1) {
            if table.batch.schema_ref() != first.batch.schema_ref() {
                return Err(UnitError::SchemaMismatch(format!(
                    "table {} has schema [{}] but table 0 has [{}]",
                    index,
                    table.schema_string(),
                    first.schema_string()
                )));
            }
        }
        let batch = concat_batches(first.batch.schema_ref(), tables.iter().map(|t| &t.batch))?;
        Ok(Self { batch })
    }

    /// Join `self` (left) with `other` (right) on one key column.
    ///
    /// Both key columns must have the same type. The key column appears
    /// once, in the left table's position, and unmatched right rows carry
    /// their own key. Right-side columns whose names collide with left-side
    /// ones get a `_right` suffix. Null keys never match.
    pub fn join(&self, other: &Table, on: &str, how: JoinKind) -> UnitResult<Table> {
        let left_key = self.require_column(on)?;
        let right_key = other.require_column(on)?;
        if left_key.dtype != right_key.dtype {
            return Err(UnitError::ColumnType {
                column: on.to_string(),
                expected: left_key.dtype.to_string(),
                found: right_key.dtype.to_string(),
            });
        }

        let converter = RowConverter::new(vec![SortField::new(left_key.dtype.arrow())])?;
        let left_rows = converter.convert_columns(&[left_key.array.clone()])?;
        let right_rows = converter.convert_columns(&[right_key.array.clone()])?;

        let mut right_index: HashMap<Row<'_>, Vec<u32>> = HashMap::new();
        for row in 0..right_rows.num_rows() {
            if right_key.array.is_valid(row) {
                right_index.entry(right_rows.row(row)).or_default().push(row as u32);
            }
        }

        // (left row, right row) pairs in output order
        let mut left_take: Vec<Option<u32>> = Vec::new();
        let mut right_take: Vec<Option<u32>> = Vec::new();
        let mut matched_right = vec![false; other.height()];
        for row in 0..left_rows.num_rows() {
            let matches = if left_key.array.is_valid(row) {
                right_index.get(&left_rows.row(row))
            } else {
                None
            };
            match matches {
                Some(rows) => {
                    for &right_row in rows {
                        matched_right[right_row as usize] = true;
                        left_take.push(Some(row as u32));
                        right_take.push(Some(right_row));
                    }
                }
                None if matches!(how, JoinKind::Left | JoinKind::Outer) => {
                    left_take.push(Some(row as u32));
                    right_take.push(None);
                }
                None => {}
            }
        }
        if matches!(how, JoinKind::Right | JoinKind::Outer) {
            for (right_row, matched) in matched_right.iter().enumerate() {
                if !matched {
                    left_take.push(None);
                    right_take.push(Some(right_row as u32));
                }
            }
        }

        let left_indices = UInt32Array::from(left_take);
        let right_indices = UInt32Array::from(right_take);
        let key = zip(
            &is_not_null(&left_indices)?,
            &take(left_key.array.as_ref(), &left_indices, None)?,
            &take(right_key.array.as_ref(), &right_indices, None)?,
        )?;

        let left_names: HashSet<&str> = self.column_names().into_iter().collect();
        let mut columns = Vec::with_capacity(self.width() + other.width());
        for column in self.columns() {
            let array = if column.name == on {
                key.clone()
            } else {
                take(column.array.as_ref(), &left_indices, None)?
            };
            columns.push(Self::rebuilt(&column, column.name.clone(), array));
        }
        for column in other.columns().into_iter().filter(|c| c.name != on) {
            let name = if left_names.contains(column.name.as_str()) {
                format!("{}_right", column.name)
            } else {
                column.name.clone()
            };
            let array = take(column.array.as_ref(), &right_indices, None)?;
            columns.push(Self::rebuilt(&column, name, array));
        }

        Table::new(columns)
    }

    fn rebuilt(source: &Column, name: String, array: ArrayRef) -> Column {
        Column::typed(name, source.dtype, array)
    }

    fn schema_string(&self) -> String {
        self.columns()
            .iter()
            .map(|c| format!("{}: {}", c.name, c.dtype))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Table {
        Table::new(vec![
            Column::int64("id", [Some(1), Some(2), Some(3)]),
            Column::utf8("name", [Some("ann"), Some("bob"), Some("cy")]),
        ])
        .unwrap()
    }

    fn cards() -> Table {
        Table::new(vec![
            Column::int64("id", [Some(1), Some(1), Some(4)]),
            Column::utf8("name", [Some("visa"), Some("amex"), Some("mc")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let result = Table::new(vec![
            Column::int64("a", [Some(1)]),
            Column::int64("b", []),
        ]);
        assert!(matches!(result, Err(UnitError::InvalidTable(_))));
    }

    #[test]
    fn test_new_rejects_duplicate_names() {
        let result = Table::new(vec![
            Column::int64("a", []),
            Column::utf8::<&str>("a", []),
        ]);
        assert!(matches!(result, Err(UnitError::InvalidTable(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn test_from_values_rejects_foreign_cells() {
        let result = Column::from_values("id", DataType::Int64, &[Value::Int(1), Value::from("2")]);
        match result.unwrap_err() {
            UnitError::ColumnType { column, expected, found } => {
                assert_eq!(column, "id");
                assert_eq!(expected, "int64");
                assert_eq!(found, "utf8");
            }
            other => panic!("Expected ColumnType, got {:?}", other),
        }

        let floats = Column::from_values("x", DataType::Float64, &[Value::Int(1)]);
        assert!(matches!(floats, Err(UnitError::ColumnType { .. })));
    }

    #[test]
    fn test_column_new_normalizes_arrow_types() {
        let narrow: ArrayRef = Arc::new(arrow::array::Int32Array::from(vec![Some(7), None]));
        let column = Column::new("n", narrow).unwrap();
        assert_eq!(column.dtype(), DataType::Int64);
        assert_eq!(column.values(), vec![Value::Int(7), Value::Null]);

        let binary: ArrayRef = Arc::new(arrow::array::BinaryArray::from(vec![&b"x"[..]]));
        assert!(matches!(Column::new("b", binary), Err(UnitError::ColumnType { .. })));
    }

    #[test]
    fn test_vstack_appends_rows() {
        let stacked = Table::vstack(&[users(), users(), users()]).unwrap();
        assert_eq!(stacked.height(), 9);
        assert_eq!(stacked.width(), 2);
        assert_eq!(stacked.column("id").unwrap().value(3), Value::Int(1));
    }

    #[test]
    fn test_vstack_rejects_schema_mismatch() {
        let other = Table::new(vec![Column::int64("id", [])]).unwrap();
        let result = Table::vstack(&[users(), other]);
        assert!(matches!(result, Err(UnitError::SchemaMismatch(_))));
    }

    #[test]
    fn test_inner_join() {
        let joined = users().join(&cards(), "id", JoinKind::Inner).unwrap();
        assert_eq!(joined.height(), 2);
        assert_eq!(joined.column_names(), vec!["id", "name", "name_right"]);
        assert_eq!(joined.column("name_right").unwrap().value(1), Value::from("amex"));
    }

    #[test]
    fn test_left_join_keeps_unmatched_left_rows() {
        let joined = users().join(&cards(), "id", JoinKind::Left).unwrap();
        assert_eq!(joined.height(), 4);
        assert_eq!(joined.column("name_right").unwrap().null_count(), 2);
    }

    #[test]
    fn test_outer_join_carries_right_keys() {
        let joined = users().join(&cards(), "id", JoinKind::Outer).unwrap();
        assert_eq!(joined.height(), 5);
        assert_eq!(joined.column("id").unwrap().value(4), Value::Int(4));
        assert_eq!(joined.column("id").unwrap().null_count(), 0);
        assert_eq!(joined.column("name").unwrap().value(4), Value::Null);
    }

    #[test]
    fn test_right_join() {
        let joined = users().join(&cards(), "id", JoinKind::Right).unwrap();
        assert_eq!(joined.height(), 3);
    }

    #[test]
    fn test_join_null_keys_never_match() {
        let left = Table::new(vec![Column::int64("id", [None, Some(1)])]).unwrap();
        let right = Table::new(vec![Column::int64("id", [None, Some(1)])]).unwrap();
        assert_eq!(left.join(&right, "id", JoinKind::Inner).unwrap().height(), 1);
        assert_eq!(left.join(&right, "id", JoinKind::Outer).unwrap().height(), 3);
    }

    #[test]
    fn test_join_missing_key_column() {
        let result = users().join(&cards(), "user", JoinKind::Inner);
        assert!(matches!(result, Err(UnitError::ColumnNotFound { column }) if column == "user"));
    }

    #[test]
    fn test_join_rejects_key_type_mismatch() {
        let ints = Table::new(vec![Column::int64("id", [Some(1)])]).unwrap();
        let text = Table::new(vec![Column::utf8("id", [Some("2")])]).unwrap();
        for how in [JoinKind::Inner, JoinKind::Outer] {
            match ints.join(&text, "id", how).unwrap_err() {
                UnitError::ColumnType { column, expected, found } => {
                    assert_eq!(column, "id");
                    assert_eq!(expected, "int64");
                    assert_eq!(found, "utf8");
                }
                other => panic!("Expected ColumnType, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_cast_is_strict() {
        let text = Column::utf8("t", [Some("12.5"), Some(" 7 "), Some(""), None]);
        assert_eq!(
            text.cast(DataType::Float64).unwrap().values(),
            vec![Value::Float(12.5), Value::Float(7.0), Value::Null, Value::Null]
        );
        assert!(Column::utf8("t", [Some("abc")]).cast(DataType::Int64).is_err());
        assert!(Column::float64("f", [Some(1.5)]).cast(DataType::Int64).is_err());
        assert_eq!(
            Column::int64("i", [Some(3)]).cast(DataType::Utf8).unwrap().value(0),
            Value::from("3")
        );
    }

    #[test]
    fn test_cast_rejects_floats_outside_int_range() {
        let column = Column::float64("big", [Some(1e20), Some(2.0)]);
        match column.cast(DataType::Int64).unwrap_err() {
            UnitError::Cast { column, dtype, .. } => {
                assert_eq!(column, "big");
                assert_eq!(dtype, "int64");
            }
            other => panic!("Expected Cast, got {:?}", other),
        }
        assert!(Column::float64("neg", [Some(-1e19)]).cast(DataType::Int64).is_err());
        assert_eq!(
            Column::float64("ok", [Some(2.0)]).cast(DataType::Int64).unwrap().value(0),
            Value::Int(2)
        );
    }

    #[test]
    fn test_cast_text_to_date() {
        let column = Column::utf8("d", [Some("2024-03-01"), None]);
        let dates = column.cast(DataType::Date).unwrap();
        assert_eq!(dates.dtype(), DataType::Date);
        assert_eq!(dates.value(0), Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(Column::utf8("d", [Some("March")]).cast(DataType::Date).is_err());
    }

    #[test]
    fn test_fill_nulls_casts_fill_value() {
        let column = Column::float64("x", [Some(1.5), None]);
        let filled = column.fill_nulls(&Value::Int(0)).unwrap();
        assert_eq!(filled.values(), vec![Value::Float(1.5), Value::Float(0.0)]);

        let text = Column::utf8("t", [None, Some("a")]);
        assert!(text.fill_nulls(&Value::Null).unwrap().value(0).is_null());
        assert!(Column::int64("i", [None]).fill_nulls(&Value::from("x")).is_err());
    }

    #[test]
    fn test_value_cast() {
        assert_eq!(Value::from("42").cast(DataType::Int64).unwrap(), Value::Int(42));
        assert_eq!(Value::Int(1).cast(DataType::Float64).unwrap(), Value::Float(1.0));
        assert_eq!(Value::Null.cast(DataType::Boolean).unwrap(), Value::Null);
        assert!(Value::Float(1e20).cast(DataType::Int64).is_err());
    }

    #[test]
    fn test_join_kind_from_str() {
        assert_eq!("outer".parse::<JoinKind>(), Ok(JoinKind::Outer));
        assert!("cross".parse::<JoinKind>().is_err());
    }

    #[test]
    fn test_with_column_replaces_in_place() {
        let renamed = users()
            .with_column(Column::utf8("name", [Some("x"), Some("y"), Some("z")]))
            .unwrap();
        assert_eq!(renamed.column_names(), vec!["id", "name"]);
        assert_eq!(renamed.row(0).unwrap()[1], Value::from("x"));
    }

    #[test]
    fn test_without_column() {
        let table = users().without_column("name").unwrap();
        assert_eq!(table.column_names(), vec!["id"]);
        assert!(matches!(users().without_column("nope"), Err(UnitError::ColumnNotFound { .. })));
    }

    #[test]
    fn test_date_cells_round_trip() {
        let day = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
        let noon = day.and_hms_opt(12, 0, 0).unwrap();
        let table = Table::new(vec![
            Column::date("d", [Some(day)]),
            Column::datetime("t", [Some(noon)]),
        ])
        .unwrap();
        assert_eq!(table.row(0).unwrap(), vec![Value::Date(day), Value::Datetime(noon)]);
    }
}
