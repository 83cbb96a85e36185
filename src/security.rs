//! Security Module
//!
//! ワークブックを開く前に行うアーカイブの事前検査。
//! ZIP bomb攻撃、パストラバーサル攻撃、過大な入力への対策を提供します。

use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::error::GridScheduleError;

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SecurityConfig {
    /// 展開後の最大サイズ（バイト）
    /// デフォルト: 256MB
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB (104_857_600 bytes)
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 64MB
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 268_435_456, // 256MB
            max_file_count: 10_000,
            max_file_size: 104_857_600,       // 100MB
            max_input_file_size: 67_108_864, // 64MB
        }
    }
}

/// ファイルパスの検証
///
/// パストラバーサル攻撃を防ぐため、ファイルパスを検証します。
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（`..`や絶対パスを含む）
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    // 絶対パス（Unix形式の`/`、ドライブレター付きのWindows形式）
    let bytes = path.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || has_drive {
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

/// 入力サイズの上限を検査する
pub(crate) fn check_input_size(len: usize, config: &SecurityConfig) -> Result<(), GridScheduleError> {
    if len as u64 > config.max_input_file_size {
        return Err(GridScheduleError::SecurityViolation(format!(
            "Input file size exceeds maximum: {} bytes (max: {} bytes)",
            len, config.max_input_file_size
        )));
    }
    Ok(())
}

/// ZIPアーカイブの中身を展開せずに検査する
///
/// ファイル数、各エントリのパスと宣言サイズ、展開後サイズの合計を検査します。
///
/// # 発生し得るエラー
///
/// * `GridScheduleError::Zip` - ZIPとして読めない場合
/// * `GridScheduleError::SecurityViolation` - 制限を超えた場合、危険なパスを含む場合
pub(crate) fn check_archive<R: Read + Seek>(
    reader: R,
    config: &SecurityConfig,
) -> Result<(), GridScheduleError> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| GridScheduleError::Zip(format!("{}", e)))?;

    if archive.len() > config.max_file_count {
        return Err(GridScheduleError::SecurityViolation(format!(
            "ZIP archive contains too many files: {} (max: {})",
            archive.len(),
            config.max_file_count
        )));
    }

    let mut total_decompressed_size = 0u64;
    for i in 0..archive.len() {
        let file = archive
            .by_index(i)
            .map_err(|e| GridScheduleError::Zip(format!("{}", e)))?;

        let file_name = file.name();
        validate_zip_path(file_name).map_err(|e| {
            GridScheduleError::SecurityViolation(format!("Invalid ZIP path: {}", e))
        })?;

        let file_size = file.size();
        if file_size > config.max_file_size {
            return Err(GridScheduleError::SecurityViolation(format!(
                "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                file_name, file_size, config.max_file_size
            )));
        }

        total_decompressed_size = total_decompressed_size.checked_add(file_size).ok_or_else(|| {
            GridScheduleError::SecurityViolation(
                "Total decompressed size calculation overflow".to_string(),
            )
        })?;
        if total_decompressed_size > config.max_decompressed_size {
            return Err(GridScheduleError::SecurityViolation(format!(
                "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                total_decompressed_size, config.max_decompressed_size
            )));
        }
    }

    log::debug!(
        "archive check passed: {} entries, {} bytes decompressed",
        archive.len(),
        total_decompressed_size
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(body).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_validate_zip_path_valid() {
        assert!(validate_zip_path("xl/workbook.xml").is_ok());
        assert!(validate_zip_path("xl/worksheets/sheet1.xml").is_ok());
        assert!(validate_zip_path("xl/sharedStrings.xml").is_ok());
        assert!(validate_zip_path("xl/media/image..png").is_ok());
    }

    #[test]
    fn test_validate_zip_path_rejections() {
        assert!(validate_zip_path("").is_err());
        assert!(validate_zip_path("/etc/passwd").is_err());
        assert!(validate_zip_path("C:\\Windows\\system32").is_err());
        assert!(validate_zip_path("d:/xl/workbook.xml").is_err());
        assert!(validate_zip_path("../etc/passwd").is_err());
        assert!(validate_zip_path("xl/../../etc/passwd").is_err());
        assert!(validate_zip_path("xl/..").is_err());
        assert!(validate_zip_path("xl\\workbook.xml").is_err());
    }

    #[test]
    fn test_check_input_size() {
        let config = SecurityConfig {
            max_input_file_size: 10,
            ..SecurityConfig::default()
        };
        assert!(check_input_size(10, &config).is_ok());
        assert!(matches!(
            check_input_size(11, &config),
            Err(GridScheduleError::SecurityViolation(_))
        ));
    }

    #[test]
    fn test_check_archive_accepts_plain_archive() {
        let bytes = archive(&[("xl/workbook.xml", b"<workbook/>"), ("[Content_Types].xml", b"<Types/>")]);
        assert!(check_archive(Cursor::new(bytes), &SecurityConfig::default()).is_ok());
    }

    #[test]
    fn test_check_archive_rejects_traversal() {
        let bytes = archive(&[("../evil.xml", b"x")]);
        match check_archive(Cursor::new(bytes), &SecurityConfig::default()) {
            Err(GridScheduleError::SecurityViolation(msg)) => assert!(msg.contains("Invalid ZIP path")),
            other => panic!("Expected SecurityViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_check_archive_limits() {
        let bytes = archive(&[("a.xml", b"0123456789"), ("b.xml", b"0123456789")]);

        let few_files = SecurityConfig {
            max_file_count: 1,
            ..SecurityConfig::default()
        };
        assert!(matches!(
            check_archive(Cursor::new(bytes.clone()), &few_files),
            Err(GridScheduleError::SecurityViolation(_))
        ));

        let small_files = SecurityConfig {
            max_file_size: 5,
            ..SecurityConfig::default()
        };
        assert!(matches!(
            check_archive(Cursor::new(bytes.clone()), &small_files),
            Err(GridScheduleError::SecurityViolation(_))
        ));

        let small_total = SecurityConfig {
            max_decompressed_size: 15,
            ..SecurityConfig::default()
        };
        assert!(matches!(
            check_archive(Cursor::new(bytes), &small_total),
            Err(GridScheduleError::SecurityViolation(_))
        ));
    }

    #[test]
    fn test_check_archive_rejects_non_zip() {
        let result = check_archive(Cursor::new(b"not a zip file".to_vec()), &SecurityConfig::default());
        assert!(matches!(result, Err(GridScheduleError::Zip(_))));
    }
}
