//! Parser Module
//!
//! ワークブック読み込み層。抽出処理はケイパビリティトレイト[`WorkbookSource`]
//! にのみ依存し、具体的なXLSXパーサー（calamine）は[`CalamineWorkbook`]が提供します。

mod source;
mod workbook;

pub use source::{RowStream, SheetVisibility, WorkbookSource};
pub use workbook::CalamineWorkbook;
