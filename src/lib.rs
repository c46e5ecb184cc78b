//! xlsxmd - Bounded, cancellable XLSX to Markdown table conversion
//!
//! This crate converts every sheet of an XLSX workbook into a Markdown table and
//! assembles a combined document plus per-sheet metadata. Conversion runs under
//! resource limits (sheet count, cells per sheet, archive size) and a cooperative
//! cancellation token that is polled before the workbook is opened, before each
//! sheet and before each row.
//!
//! Formulas are never evaluated (stored values are used), merged cells are
//! flattened to their top-left value, and both are reported as sheet warnings.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use xlsxmd::ConverterBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a converter with default limits (50 sheets, 200k cells, 10s)
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let result = converter.convert_reader(File::open("example.xlsx")?)?;
//!     println!("{}", result.combined_markdown);
//!
//!     for sheet in &result.sheets {
//!         if let Some(error) = &sheet.error {
//!             eprintln!("{}: {}", sheet.name, error);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom Configuration
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use xlsxmd::{ConversionMetrics, ConverterBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let metrics = Arc::new(ConversionMetrics::new());
//!     let converter = ConverterBuilder::new()
//!         .include_hidden_sheets(true)
//!         .with_max_sheets(0) // unlimited
//!         .with_timeout(Duration::from_secs(30))
//!         .with_observer(metrics.clone())
//!         .build()?;
//!
//!     let bytes = std::fs::read("example.xlsx")?;
//!     let result = converter.convert(&bytes)?;
//!     println!("{}", result.to_json_pretty()?);
//!     println!("{:?}", metrics.snapshot());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Caller-controlled Cancellation
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use xlsxmd::{convert, Cancellation, ConversionOptions, ConvertError};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = std::fs::read("example.xlsx")?;
//! let cancel = Cancellation::with_timeout(Duration::from_secs(5));
//!
//! // Another thread may call `cancel.cancel("client disconnected")`.
//! match convert(&bytes, &ConversionOptions::default(), &cancel) {
//!     Ok(result) => println!("{}", result.combined_markdown),
//!     Err(ConvertError::Timeout) => eprintln!("took too long"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod audit;
mod builder;
mod cancel;
mod error;
mod extract;
mod formatter;
mod grid;
mod metrics;
mod output;
mod parser;
mod pipeline;
mod security;
mod types;

// 公開API
pub use api::{
    ConversionOptions, ConversionResult, Meta, SheetOutcome, SkippedSheet, HIDDEN_SHEET_REASON,
};
pub use audit::{AuditSink, ConversionRecord, JsonLinesAuditSink, SheetRecord};
pub use builder::{Converter, ConverterBuilder, DEFAULT_TIMEOUT};
pub use cancel::Cancellation;
pub use error::{ConvertError, WorkbookError};
pub use extract::{
    extract_sheet, ExtractionFailure, SheetExtraction, FORMULA_WARNING, MERGED_CELLS_WARNING,
    VISIBILITY_WARNING,
};
pub use grid::{normalize_rows, trim_trailing_empty, Table};
pub use metrics::{ConversionMetrics, ConversionObserver, MetricsSnapshot, NoopObserver};
pub use output::{combine_markdown, escape_cell, render_sheet, RenderedSheet, EMPTY_SHEET_MESSAGE};
pub use parser::{CalamineWorkbook, RowStream, SheetVisibility, WorkbookSource};
pub use pipeline::{convert, convert_workbook};
pub use security::ArchiveLimits;
pub use types::{CellCoord, MergedRegion, Row};
