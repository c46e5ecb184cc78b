//! Output Module
//!
//! 変換結果の出力（Markdownテーブルの描画と、シート結果の結合）を提供するモジュール。

mod markdown;

pub use markdown::{combine_markdown, escape_cell, render_sheet, RenderedSheet, EMPTY_SHEET_MESSAGE};
