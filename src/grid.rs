//! Grid Module
//!
//! 不揃いな（ragged）行データを矩形のテーブルに正規化するモジュール。
//! 純粋関数のみで構成され、副作用はありません。

use crate::types::Row;

/// 正規化済みの矩形テーブル
///
/// 空でない場合、すべての行が同じ列数を持ちます。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
    cols: usize,
}

impl Table {
    /// 空のテーブルかどうか
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols == 0
    }

    /// 行数
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 列数
    pub fn col_count(&self) -> usize {
        self.cols
    }

    /// 行
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

/// 行末の空セル（空白のみのセルを含む）を取り除いた長さ
pub fn trimmed_len(row: &[String]) -> usize {
    row.iter()
        .rposition(|value| !value.trim().is_empty())
        .map_or(0, |last| last + 1)
}

/// 行末の空セルを取り除く
///
/// すべてのセルが空の行は、空セル1つではなく長さ0の行になります。
/// 残ったセルの値は変更しません（前後の空白も保持）。
pub fn trim_trailing_empty(row: &[String]) -> Row {
    row[..trimmed_len(row)].to_vec()
}

/// 行の集合を矩形テーブルに正規化する
///
/// 1. 各行の末尾の空セルを取り除く
/// 2. テーブル末尾の空行を取り除く
/// 3. 残った行の最大列数に合わせて、各行の右側を空文字列で埋める
///
/// 行が残らない、または最大列数が0の場合は空のテーブルを返します。
pub fn normalize_rows(rows: &[Row]) -> Table {
    let mut trimmed: Vec<Row> = rows.iter().map(|row| trim_trailing_empty(row)).collect();

    let kept = trimmed
        .iter()
        .rposition(|row| !row.is_empty())
        .map_or(0, |last| last + 1);
    trimmed.truncate(kept);

    let cols = trimmed.iter().map(Vec::len).max().unwrap_or(0);
    if trimmed.is_empty() || cols == 0 {
        return Table::default();
    }

    for row in &mut trimmed {
        row.resize(cols, String::new());
    }

    Table {
        rows: trimmed,
        cols,
    }
}
