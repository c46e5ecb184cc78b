//! Security Module
//!
//! XLSX（ZIPコンテナ）を解析する前に、アーカイブの構造を検査するモジュール。
//! ZIP bomb攻撃、パストラバーサル攻撃などへの対策を提供します。

use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::error::ConvertError;

/// アーカイブの制限値
///
/// 入力バイト列自体のサイズ制限は転送層の責務で、ここでは展開後のサイズと
/// エントリ数のみを扱います。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLimits {
    /// 展開後の合計最大サイズ（バイト）
    /// デフォルト: 1GB (1_073_741_824 bytes)
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_file_size: u64,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_decompressed_size: 1_073_741_824, // 1GB
            max_file_count: 10_000,
            max_file_size: 104_857_600, // 100MB
        }
    }
}

/// アーカイブを検査する
///
/// # 戻り値
///
/// * `Ok(())` - 制限内の場合
/// * `Err(ConvertError::InvalidWorkbook)` - ZIPとして読めない、または制限に違反した場合
pub(crate) fn inspect_archive<R: Read + Seek>(
    reader: R,
    limits: &ArchiveLimits,
) -> Result<(), ConvertError> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| ConvertError::InvalidWorkbook(e.to_string()))?;

    if archive.len() > limits.max_file_count {
        return Err(ConvertError::InvalidWorkbook(format!(
            "archive contains too many files: {} (max: {})",
            archive.len(),
            limits.max_file_count
        )));
    }

    let mut total_decompressed_size = 0u64;
    for i in 0..archive.len() {
        let file = archive
            .by_index(i)
            .map_err(|e| ConvertError::InvalidWorkbook(e.to_string()))?;

        let file_name = file.name();
        validate_zip_path(file_name)
            .map_err(|e| ConvertError::InvalidWorkbook(format!("invalid archive path: {}", e)))?;

        let file_size = file.size();
        if file_size > limits.max_file_size {
            return Err(ConvertError::InvalidWorkbook(format!(
                "archive entry '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                file_name, file_size, limits.max_file_size
            )));
        }

        total_decompressed_size = total_decompressed_size
            .checked_add(file_size)
            .ok_or_else(|| {
                ConvertError::InvalidWorkbook("decompressed size overflow".to_string())
            })?;

        if total_decompressed_size > limits.max_decompressed_size {
            return Err(ConvertError::InvalidWorkbook(format!(
                "total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                total_decompressed_size, limits.max_decompressed_size
            )));
        }
    }

    Ok(())
}

/// ファイルパスの検証
///
/// パストラバーサル攻撃を防ぐため、ZIP内のパスを検証します。
fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    // 絶対パス（Unix形式の`/`、Windowsのドライブレター）
    let bytes = path.as_bytes();
    if path.starts_with('/') || (bytes.len() >= 2 && bytes[1] == b':') {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}
