//! Markdown Renderer
//!
//! 正規化済みのテーブルをMarkdownテーブル文字列に変換し、
//! シートごとの結果を1つのMarkdown文書に結合します。

use crate::api::SheetOutcome;
use crate::grid::normalize_rows;
use crate::types::Row;

/// データのないシートに出力する固定文字列
pub const EMPTY_SHEET_MESSAGE: &str = "_No data in this sheet._";

/// 描画結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSheet {
    /// Markdownテーブル、またはデータなしの固定文字列
    pub markdown: String,
    /// 描画した行数（ヘッダー行を含む）
    pub row_count: usize,
    /// 描画した列数
    pub col_count: usize,
}

/// 行データをMarkdownテーブルに描画する
///
/// 入力は正規化（[`normalize_rows`]）してから描画します。正規化後のテーブルが空の場合は
/// [`EMPTY_SHEET_MESSAGE`]を返し、行数・列数は`0`になります。
///
/// # 戻り値
///
/// 1行目をヘッダー、続けて区切り行（`| --- |`）、残りを本文とするテーブル。
/// 行は`\n`で区切られ、末尾に改行は付きません。
///
/// # 使用例
///
/// ```rust
/// use xlsxmd::render_sheet;
///
/// let rows = vec![
///     vec!["Name".to_string(), "Age".to_string()],
///     vec!["Asha".to_string(), "29".to_string()],
/// ];
/// let rendered = render_sheet(&rows);
/// assert_eq!(rendered.markdown, "| Name | Age |\n| --- | --- |\n| Asha | 29 |");
/// assert_eq!((rendered.row_count, rendered.col_count), (2, 2));
/// ```
pub fn render_sheet(rows: &[Row]) -> RenderedSheet {
    let table = normalize_rows(rows);
    if table.is_empty() {
        return RenderedSheet {
            markdown: EMPTY_SHEET_MESSAGE.to_string(),
            row_count: 0,
            col_count: 0,
        };
    }

    let mut lines = Vec::with_capacity(table.row_count() + 1);
    let mut body = table.rows().iter();
    if let Some(header) = body.next() {
        lines.push(format_row(header));
    }
    lines.push(format_separator(table.col_count()));
    lines.extend(body.map(|row| format_row(row)));

    RenderedSheet {
        markdown: lines.join("\n"),
        row_count: table.row_count(),
        col_count: table.col_count(),
    }
}

/// セル値をMarkdownテーブル用にエスケープする
///
/// CRLFをLFに、LFを`<br>`に置換した後、`|`を`\|`にエスケープします。
/// バックスラッシュ自体はエスケープしません。
pub fn escape_cell(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    value
        .replace("\r\n", "\n")
        .replace('\n', "<br>")
        .replace('|', "\\|")
}

fn format_row(row: &[String]) -> String {
    let cells: Vec<String> = row.iter().map(|cell| escape_cell(cell)).collect();
    format!("| {} |", cells.join(" | "))
}

fn format_separator(cols: usize) -> String {
    format!("| {} |", vec!["---"; cols].join(" | "))
}

/// シートごとの結果を1つのMarkdown文書に結合する
///
/// 各シートについて`## シート名`の見出しを出力し、エラーがあれば
/// `> Error: ...`の1行のみ、なければ`> Warning: ...`行に続けて描画済みMarkdownを出力します。
/// シートの間は空行で区切ります。名前が空の結果は出力しません。
pub fn combine_markdown(sheets: &[SheetOutcome]) -> String {
    let mut blocks: Vec<String> = Vec::new();

    for sheet in sheets.iter().filter(|sheet| !sheet.name.is_empty()) {
        blocks.push(format!("## {}", sheet.name));
        if let Some(error) = &sheet.error {
            blocks.push(format!("> Error: {}", error));
            blocks.push(String::new());
            continue;
        }
        blocks.extend(
            sheet
                .warnings
                .iter()
                .map(|warning| format!("> Warning: {}", warning)),
        );
        blocks.push(sheet.markdown.clone().unwrap_or_default());
        blocks.push(String::new());
    }

    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Row> {
        data.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_render_simple_table() {
        let rendered = render_sheet(&rows(&[&["Name", "Age"], &["Asha", "29"]]));
        assert_eq!(
            rendered.markdown,
            "| Name | Age |\n| --- | --- |\n| Asha | 29 |"
        );
        assert_eq!(rendered.row_count, 2);
        assert_eq!(rendered.col_count, 2);
    }

    #[test]
    fn test_render_empty_input() {
        let rendered = render_sheet(&[]);
        assert_eq!(rendered.markdown, EMPTY_SHEET_MESSAGE);
        assert_eq!(rendered.markdown, "_No data in this sheet._");
        assert_eq!((rendered.row_count, rendered.col_count), (0, 0));
    }

    #[test]
    fn test_render_whitespace_only_rows_is_empty() {
        let rendered = render_sheet(&rows(&[&["", " "], &[]]));
        assert_eq!(rendered.markdown, EMPTY_SHEET_MESSAGE);
        assert_eq!((rendered.row_count, rendered.col_count), (0, 0));
    }

    #[test]
    fn test_render_header_only() {
        let rendered = render_sheet(&rows(&[&["Only"]]));
        assert_eq!(rendered.markdown, "| Only |\n| --- |");
        assert_eq!((rendered.row_count, rendered.col_count), (1, 1));
    }

    #[test]
    fn test_render_pads_ragged_rows() {
        let rendered = render_sheet(&rows(&[&["a", "b", "c"], &["d"], &["", "e"]]));
        assert_eq!(
            rendered.markdown,
            "| a | b | c |\n| --- | --- | --- |\n| d |  |  |\n|  | e |  |"
        );
        assert_eq!(rendered.col_count, 3);
    }

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell(""), "");
        assert_eq!(escape_cell("a|b"), "a\\|b");
        assert_eq!(escape_cell("x\r\ny"), "x<br>y");
        assert_eq!(escape_cell("x\ny\nz"), "x<br>y<br>z");
        assert_eq!(escape_cell("C:\\path"), "C:\\path");
        assert_eq!(escape_cell("a\rb"), "a\rb");
    }

    #[test]
    fn test_escaping_does_not_change_column_count() {
        let rendered = render_sheet(&rows(&[&["a|b", "c"], &["x\r\ny", "|"]]));
        assert_eq!(
            rendered.markdown,
            "| a\\|b | c |\n| --- | --- |\n| x<br>y | \\| |"
        );
        assert_eq!(rendered.col_count, 2);
    }

    #[test]
    fn test_combine_markdown() {
        let sheets = vec![
            SheetOutcome {
                name: "Data".to_string(),
                markdown: Some("| a |\n| --- |".to_string()),
                warnings: vec!["Merged cells were flattened to their top-left value.".to_string()],
                row_count: 1,
                col_count: 1,
                ..SheetOutcome::default()
            },
            SheetOutcome {
                name: "Big".to_string(),
                error: Some("sheet exceeds cell limit".to_string()),
                ..SheetOutcome::default()
            },
        ];

        assert_eq!(
            combine_markdown(&sheets),
            "## Data\n\
             > Warning: Merged cells were flattened to their top-left value.\n\
             | a |\n| --- |\n\
             \n\
             ## Big\n\
             > Error: sheet exceeds cell limit\n"
        );
    }

    #[test]
    fn test_combine_skips_unnamed_entries() {
        let sheets = vec![
            SheetOutcome {
                markdown: Some("ignored".to_string()),
                ..SheetOutcome::default()
            },
            SheetOutcome {
                name: "Empty".to_string(),
                markdown: Some(EMPTY_SHEET_MESSAGE.to_string()),
                ..SheetOutcome::default()
            },
        ];

        assert_eq!(
            combine_markdown(&sheets),
            "## Empty\n_No data in this sheet._\n"
        );
        assert_eq!(combine_markdown(&[]), "");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_escaped_cell_has_no_raw_newline_or_unescaped_pipe(value in "[a-z|\\r\\n ]{0,12}") {
                let escaped = escape_cell(&value);
                prop_assert!(!escaped.contains('\n'));
                let unescaped_pipes = escaped
                    .match_indices('|')
                    .filter(|(idx, _)| *idx == 0 || escaped.as_bytes()[idx - 1] != b'\\')
                    .count();
                prop_assert_eq!(unescaped_pipes, 0);
            }

            #[test]
            fn test_every_line_has_col_count_cells(
                data in prop::collection::vec(prop::collection::vec("[a-z|\\n]{0,3}", 1..5), 1..6)
            ) {
                let rendered = render_sheet(&data);
                if rendered.col_count > 0 {
                    let lines: Vec<&str> = rendered.markdown.split('\n').collect();
                    prop_assert_eq!(lines.len(), rendered.row_count + 1);
                    for line in lines {
                        let delimiters = line
                            .match_indices('|')
                            .filter(|(idx, _)| *idx == 0 || line.as_bytes()[idx - 1] != b'\\')
                            .count();
                        prop_assert_eq!(delimiters, rendered.col_count + 1);
                    }
                }
            }
        }
    }
}
