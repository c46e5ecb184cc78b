//! Formatter Module
//!
//! calamineのセル値を表示文字列に変換するモジュール。
//! 数式は評価せず、ファイルに保存されている値をそのまま使用します。

use calamine::{Data, DataType};
use chrono::{NaiveDateTime, Timelike};

/// セルフォーマッター
///
/// セル値のフォーマット処理のファサードとして機能します。
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CellFormatter {
    date_formatter: DateFormatter,
    number_formatter: NumberFormatter,
}

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// セル値をフォーマット
    ///
    /// # 引数
    ///
    /// * `cell` - calamineのセルデータ
    ///
    /// # 戻り値
    ///
    /// 表示用の文字列。空セルは空文字列になります。
    pub fn format_cell(&self, cell: &Data) -> String {
        match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            Data::Int(i) => i.to_string(),
            Data::Float(f) => self.number_formatter.format(*f),
            Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            Data::Error(e) => e.to_string(),
            Data::DateTime(_) => cell
                .as_datetime()
                .map(|dt| self.date_formatter.format(dt))
                .unwrap_or_else(|| cell.to_string()),
            other => other.to_string(),
        }
    }
}

/// 日付フォーマッター
///
/// 時刻部分がない場合は`YYYY-MM-DD`、ある場合は`YYYY-MM-DD HH:MM:SS`を出力します。
/// 1900/1904年エポックの判定はcalamine側で行われます。
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DateFormatter;

impl DateFormatter {
    pub fn format(&self, value: NaiveDateTime) -> String {
        let time = value.time();
        if time.hour() == 0 && time.minute() == 0 && time.second() == 0 {
            value.format("%Y-%m-%d").to_string()
        } else {
            value.format("%Y-%m-%d %H:%M:%S").to_string()
        }
    }
}

/// 数値フォーマッター
///
/// 最短表現で出力します（`29.0` -> `29`）。
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NumberFormatter;

impl NumberFormatter {
    pub fn format(&self, value: f64) -> String {
        value.to_string()
    }
}
