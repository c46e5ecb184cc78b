//! Types Module
//!
//! ワークブック読み込み層と抽出処理で共有する座標・範囲型を定義するモジュール。

use std::fmt;

/// 1行分のセル値（元の列順）
///
/// 正規化前はシートの最大列数より短い（ragged）ことがあります。
pub type Row = Vec<String>;

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    pub fn to_a1_notation(self) -> String {
        format!("{}{}", col_index_to_letter(self.col), self.row + 1)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1_notation())
    }
}

/// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
fn col_index_to_letter(mut col: u32) -> String {
    let mut result = String::new();
    loop {
        let remainder = col % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    result
}

/// セル結合範囲（両端を含む）
///
/// 値は左上セル（アンカー）にのみ格納されており、抽出処理はジオメトリを
/// 補正しません。結合の存在は警告として報告されるだけです。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergedRegion {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl MergedRegion {
    /// 新しい結合範囲を生成
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        Self { start, end }
    }

    /// 左上セル（値を保持するセル）の座標
    pub fn anchor(&self) -> CellCoord {
        self.start
    }
}

impl fmt::Display for MergedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}
