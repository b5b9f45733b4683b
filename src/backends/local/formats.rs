// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Table persistence for the three supported file formats.
//!
//! The format is chosen from the token after the last `.` in the path:
//! `csv`, `pq` (Parquet) or `json` (an array of row objects). Anything
//! else is [`UnitError::UnsupportedFormat`].
//!
//! All three go through arrow readers and writers. JSON has no date type,
//! so date columns written as JSON read back as text.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{AsArray, StringArray};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format as CsvFormat;
use arrow::csv::{ReaderBuilder as CsvReaderBuilder, WriterBuilder as CsvWriterBuilder};
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use arrow::json::reader::infer_json_schema_from_iterator;
use arrow::json::{ArrayWriter, ReaderBuilder as JsonReaderBuilder};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde_json::Value as JsonValue;

use crate::errors::{UnitError, UnitResult};
use crate::table::{Column, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Parquet,
    Json,
}

impl Format {
    pub fn from_path(path: &str) -> UnitResult<Format> {
        let token = match path.rfind('.') {
            Some(index) => &path[index + 1..],
            None => path,
        };
        match token.to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "pq" => Ok(Format::Parquet),
            "json" => Ok(Format::Json),
            _ => Err(UnitError::UnsupportedFormat {
                token: token.to_string(),
                path: path.to_string(),
            }),
        }
    }

    pub fn read(self, path: &str) -> UnitResult<Table> {
        match self {
            Format::Csv => read_csv(path),
            Format::Parquet => read_parquet(path),
            Format::Json => read_json(path),
        }
    }

    pub fn write(self, path: &str, table: &Table) -> UnitResult<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| UnitError::io(path, e))?;
            }
        }
        match self {
            Format::Csv => write_csv(path, table),
            Format::Parquet => write_parquet(path, table),
            Format::Json => write_json(path, table),
        }
    }
}

/// Read `path`, inferring the format from its extension.
pub fn read_table(path: &str) -> UnitResult<Table> {
    Format::from_path(path)?.read(path)
}

/// Write `table` to `path`, inferring the format from its extension.
/// Missing parent directories are created.
pub fn write_table(path: &str, table: &Table) -> UnitResult<()> {
    Format::from_path(path)?.write(path, table)
}

const BATCH_ROWS: usize = 8192;

/// Stitch reader batches into one table; no batches is an empty table.
fn collect_batches(schema: SchemaRef, batches: &[RecordBatch]) -> UnitResult<Table> {
    if schema.fields().is_empty() {
        return Ok(Table::empty());
    }
    let batch = concat_batches(&schema, batches)?;
    Table::from_batch(batch)
}

// ---- csv ----

/// Column types come from arrow's CSV inference over the whole file:
/// Int64, Float64, Boolean, Date and timestamps are recognized, anything
/// else is text. Empty cells are null.
fn read_csv(path: &str) -> UnitResult<Table> {
    let mut file = File::open(path).map_err(|e| UnitError::io(path, e))?;
    let (schema, _) = CsvFormat::default()
        .with_header(true)
        .infer_schema(&mut file, None)?;
    file.rewind().map_err(|e| UnitError::io(path, e))?;

    let schema = Arc::new(schema);
    let reader = CsvReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(BATCH_ROWS)
        .build(BufReader::new(file))?;
    let batches = reader.collect::<Result<Vec<_>, _>>()?;
    let table = collect_batches(schema, &batches)?;

    let columns = table
        .columns()
        .into_iter()
        .map(|column| match column.array().as_string_opt::<i32>() {
            Some(text) => {
                let cells: StringArray = text.iter().map(|v| v.filter(|s| !s.is_empty())).collect();
                Column::new(column.name(), Arc::new(cells))
            }
            None => Ok(column),
        })
        .collect::<UnitResult<Vec<_>>>()?;
    Table::new(columns)
}

fn write_csv(path: &str, table: &Table) -> UnitResult<()> {
    let file = File::create(path).map_err(|e| UnitError::io(path, e))?;
    let mut writer = CsvWriterBuilder::new()
        .with_header(true)
        .build(BufWriter::new(file));
    writer.write(table.batch())?;
    writer.into_inner().flush().map_err(|e| UnitError::io(path, e))?;
    Ok(())
}

// ---- json ----

/// An array of row objects. Keys missing from a row are null, and column
/// order is first appearance across rows.
fn read_json(path: &str) -> UnitResult<Table> {
    let file = File::open(path).map_err(|e| UnitError::io(path, e))?;
    let rows: Vec<JsonValue> = serde_json::from_reader(BufReader::new(file))?;

    let schema = Arc::new(infer_json_schema_from_iterator(
        rows.iter().map(Ok::<_, ArrowError>),
    )?);
    let mut decoder = JsonReaderBuilder::new(schema.clone())
        .with_batch_size(BATCH_ROWS)
        .with_coerce_primitive(true)
        .build_decoder()?;

    let mut batches = Vec::new();
    for chunk in rows.chunks(BATCH_ROWS) {
        decoder.serialize(chunk)?;
        if let Some(batch) = decoder.flush()? {
            batches.push(batch);
        }
    }
    collect_batches(schema, &batches)
}

fn write_json(path: &str, table: &Table) -> UnitResult<()> {
    let file = File::create(path).map_err(|e| UnitError::io(path, e))?;
    let mut writer = ArrayWriter::new(BufWriter::new(file));
    writer.write(table.batch())?;
    writer.finish()?;
    Ok(())
}

// ---- parquet ----

fn write_parquet(path: &str, table: &Table) -> UnitResult<()> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let file = File::create(path).map_err(|e| UnitError::io(path, e))?;
    let mut writer = ArrowWriter::try_new(file, table.batch().schema(), Some(props))?;
    writer.write(table.batch())?;
    writer.close()?;
    Ok(())
}

fn read_parquet(path: &str) -> UnitResult<Table> {
    let file = File::open(path).map_err(|e| UnitError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let batches = builder.build()?.collect::<Result<Vec<_>, _>>()?;
    collect_batches(schema, &batches)
}
