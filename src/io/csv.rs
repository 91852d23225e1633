//! CSV row source and sinks.
//!
//! This module provides:
//! - **Lazy row source**: [`RowSource`] yields one [`RawRecord`] per data line,
//!   keyed by the header row; [`open_rows`] opens a file for it.
//! - **Output setup**: [`create_output`] returns stdout or a file writer
//!   (creating parent directories, compressing by extension);
//!   [`close_output`] completes it.
//! - **Typed writing**: [`write_csv_vec`] serializes a slice with Serde.
//!
//! # Design notes
//! - A header row is required; every data row must have as many fields as the
//!   header. Ragged rows surface as [`PrepError::Csv`].
//! - Line numbers attached to records are the 1-based source line.

use crate::error::{PrepError, PrepResult};
use crate::io::compression::{FinishWrite, OutputWriter, auto_detect_reader, auto_detect_writer};
use crate::record::{Header, RawRecord};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use serde::Serialize;
use std::fs::{File, create_dir_all};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

/// Lazy sequence of rows from a CSV stream with a header line.
pub struct RowSource<R: Read> {
    reader: csv::Reader<R>,
    header: Arc<Header>,
}

impl<R: Read> RowSource<R> {
    /// Read the header line from `reader`.
    ///
    /// # Errors
    /// Returns an error if the header cannot be read.
    pub fn from_reader(reader: R) -> PrepResult<Self> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let header = Arc::new(Header::from_csv(reader.headers()?));
        Ok(Self { reader, header })
    }

    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }
}

impl<R: Read> Iterator for RowSource<R> {
    type Item = PrepResult<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut values = StringRecord::new();
        match self.reader.read_record(&mut values) {
            Ok(true) => {
                let line = values.position().map_or(0, csv::Position::line);
                Some(Ok(RawRecord::new(Arc::clone(&self.header), values, line)))
            }
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// Open a CSV file as a [`RowSource`], decompressing if needed.
///
/// # Errors
/// [`PrepError::InputAccess`] when the file cannot be opened; CSV errors when
/// its header cannot be read.
pub fn open_rows(path: impl AsRef<Path>) -> PrepResult<RowSource<Box<dyn Read>>> {
    let path = path.as_ref();
    let access = |source: io::Error| PrepError::InputAccess {
        path: path.to_path_buf(),
        source,
    };
    let f = File::open(path).map_err(access)?;
    let rdr = auto_detect_reader(f, path).map_err(access)?;
    RowSource::from_reader(rdr)
}

/// Writer for the run's output: the file at `path`, or stdout when `None`.
///
/// * Creates parent directories if they don't exist.
/// * Compresses when the file extension names a codec.
///
/// # Errors
/// Returns an error if the file or its directories cannot be created.
pub fn create_output(path: Option<&Path>) -> PrepResult<OutputWriter> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }
    let f = File::create(path)?;
    Ok(auto_detect_writer(f, path)?)
}

/// CSV writer over `sink` with the crate's output conventions.
pub fn csv_writer<W: Write>(sink: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(sink)
}

/// Flush a CSV writer and hand back the underlying sink, flushed.
///
/// # Errors
/// Returns an error if buffered data cannot be written.
pub fn finish_writer<W: Write>(writer: csv::Writer<W>) -> PrepResult<W> {
    let mut sink = writer.into_inner().map_err(|e| e.into_error())?;
    sink.flush()?;
    Ok(sink)
}

/// Flush a CSV writer over a run output and complete the output stream
/// (compression trailer included).
///
/// # Errors
/// Returns an error if any layer fails to write or flush.
pub fn close_output(writer: csv::Writer<OutputWriter>) -> PrepResult<()> {
    FinishWrite::finish(finish_writer(writer)?)?;
    Ok(())
}

/// Serialize `data` as CSV rows into `sink`, with a header derived from `T`.
///
/// # Returns
/// The number of rows written (i.e., `data.len()`).
///
/// # Errors
/// Returns an error if any row fails to serialize or flush.
pub fn write_csv_vec<T: Serialize, W: Write>(sink: W, data: &[T]) -> PrepResult<usize> {
    let mut wtr = WriterBuilder::new()
        .has_headers(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(sink);
    for row in data {
        wtr.serialize(row)?;
    }
    finish_writer(wtr)?;
    Ok(data.len())
}
