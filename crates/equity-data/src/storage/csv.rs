//! CSV 데이터셋 입출력.
//!
//! ## 형식
//! - 정규화 데이터셋: `date,open,high,low,close,adjusted_close,volume`, 가격 소수 2자리
//! - 지표 데이터셋: 정규화 컬럼 + 파생 지표 컬럼, 실수 소수 4자리
//! - 날짜는 `MM/DD/YYYY`, 결측값은 빈 셀
//! - passthrough 컬럼은 저장하지 않습니다
//!
//! 쓰기는 임시 파일(`<파일명>.tmp`)에 먼저 기록한 뒤 이름을 바꿉니다.
//! `stage_*`로 여러 파일을 준비해 두고 모두 성공했을 때만 `commit`하면
//! 중간에 실패해도 기존 데이터셋이 서로 다른 실행의 결과로 섞이지 않습니다.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use tracing::{info, warn};

use equity_core::{CanonicalRecord, EnrichedRecord, RawRow};

use crate::error::{DataError, Result};
use crate::normalizer::DATE_FORMAT;

/// 정규화 데이터셋 헤더.
pub const HISTORY_HEADER: &str = "date,open,high,low,close,adjusted_close,volume";

/// 지표 데이터셋 헤더.
pub const ENRICHED_HEADER: &str = "date,open,high,low,close,adjusted_close,volume,day,month_name,year,daily_return,cumulative_return,open_close_rate,moving_average_5d,volatility_5d";

fn temp_path(path: &Path) -> PathBuf {
    path.with_extension(format!(
        "{}.tmp",
        path.extension().and_then(|e| e.to_str()).unwrap_or("")
    ))
}

/// 임시 파일에 기록된 데이터셋.
///
/// `commit`하면 대상 경로로 이름을 바꾸고, 커밋하지 않고 버리면 임시 파일을 지웁니다.
#[derive(Debug)]
#[must_use = "staged dataset is discarded unless committed"]
pub struct StagedFile {
    path: PathBuf,
    tmp_path: PathBuf,
    rows: usize,
    committed: bool,
}

impl StagedFile {
    fn create<F>(path: &Path, rows: usize, write: F) -> Result<Self>
    where
        F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
    {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let staged = Self {
            path: path.to_path_buf(),
            tmp_path: temp_path(path),
            rows,
            committed: false,
        };
        let mut writer = BufWriter::new(File::create(&staged.tmp_path)?);
        write(&mut writer)?;
        writer.flush()?;

        Ok(staged)
    }

    /// 최종 저장 경로.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 임시 파일을 대상 경로로 옮깁니다. 저장한 행 수를 반환합니다.
    pub fn commit(mut self) -> Result<usize> {
        fs::rename(&self.tmp_path, &self.path)?;
        self.committed = true;

        info!(path = %self.path.display(), rows = self.rows, "Saved dataset");
        Ok(self.rows)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

fn price_cell(value: Option<Decimal>, dp: u32) -> String {
    match value {
        Some(v) => format!("{:.*}", dp as usize, v.round_dp(dp)),
        None => String::new(),
    }
}

fn volume_cell(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn canonical_cells(record: &CanonicalRecord, dp: u32) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        record.date.format(DATE_FORMAT),
        price_cell(record.open, dp),
        price_cell(record.high, dp),
        price_cell(record.low, dp),
        price_cell(record.close, dp),
        price_cell(record.adjusted_close, dp),
        volume_cell(record.volume),
    )
}

/// 정규화 데이터셋을 임시 파일에 기록합니다. `commit`하면 기존 파일을 덮어씁니다.
pub fn stage_history(path: &Path, records: &[CanonicalRecord]) -> Result<StagedFile> {
    StagedFile::create(path, records.len(), |writer| {
        writeln!(writer, "{}", HISTORY_HEADER)?;
        for record in records {
            writeln!(writer, "{}", canonical_cells(record, 2))?;
        }
        Ok(())
    })
}

/// 지표 데이터셋을 임시 파일에 기록합니다. `commit`하면 기존 파일을 덮어씁니다.
pub fn stage_enriched(path: &Path, records: &[EnrichedRecord]) -> Result<StagedFile> {
    StagedFile::create(path, records.len(), |writer| {
        writeln!(writer, "{}", ENRICHED_HEADER)?;
        for record in records {
            writeln!(
                writer,
                "{},{},{},{},{:.4},{:.4},{},{:.4},{:.4}",
                canonical_cells(&record.record, 4),
                record.day,
                record.month_name,
                record.year,
                record.daily_return,
                record.cumulative_return,
                record
                    .open_close_rate
                    .map(|v| format!("{:.4}", v))
                    .unwrap_or_default(),
                record.moving_average_5d,
                record.volatility_5d,
            )?;
        }
        Ok(())
    })
}

/// 따옴표를 고려한 CSV 한 줄 분리. 빈 셀(끝의 빈 셀 포함)을 유지합니다.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

/// CSV 텍스트를 헤더 라벨 → 셀 형태의 원시 행으로 변환합니다.
///
/// 셀 수가 헤더와 다른 행은 건너뜁니다.
pub fn parse_table(content: &str) -> Result<Vec<RawRow>> {
    let mut lines = content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| DataError::ParseError("CSV has no header row".to_string()))?;
    let headers: Vec<String> = split_csv_line(header_line.trim_start_matches('\u{feff}'))
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for line in lines {
        let cells = split_csv_line(line);
        if cells.len() != headers.len() {
            skipped += 1;
            continue;
        }
        rows.push(headers.iter().cloned().zip(cells).collect::<RawRow>());
    }

    if skipped > 0 {
        warn!(skipped, "Skipped CSV lines with mismatched column count");
    }

    Ok(rows)
}

/// 저장된 CSV 데이터셋을 원시 행으로 읽습니다.
pub fn read_table(path: &Path) -> Result<Vec<RawRow>> {
    let content = fs::read_to_string(path)?;
    let rows = parse_table(&content)?;
    info!(path = %path.display(), rows = rows.len(), "Loaded CSV table");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn record(y: i32, m: u32, d: u32, close: Option<Decimal>) -> CanonicalRecord {
        let mut record = CanonicalRecord::new(NaiveDate::from_ymd_opt(y, m, d).unwrap());
        record.open = Some(dec!(98.5));
        record.close = close;
        record.volume = Some(1_000);
        record
    }

    #[test]
    fn test_split_csv_line() {
        assert_eq!(split_csv_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_csv_line("a,,"), vec!["a", "", ""]);
        assert_eq!(split_csv_line(r#""1,234.50",x"#), vec!["1,234.50", "x"]);
        assert_eq!(split_csv_line(r#""say ""hi""",y"#), vec![r#"say "hi""#, "y"]);
    }

    #[test]
    fn test_history_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.csv");

        let records = vec![record(2023, 1, 2, Some(dec!(100.456))), record(2023, 1, 3, None)];
        assert_eq!(stage_history(&path, &records).unwrap().commit().unwrap(), 2);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], HISTORY_HEADER);
        assert_eq!(lines[1], "01/02/2023,98.50,,,100.46,,1000");
        assert_eq!(lines[2], "01/03/2023,98.50,,,,,1000");
    }

    #[test]
    fn test_enriched_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enriched.csv");

        let enriched = EnrichedRecord {
            record: record(2023, 1, 3, Some(dec!(110))),
            day: 3,
            month_name: "Enero".to_string(),
            year: 2023,
            year_month: "2023-01".to_string(),
            daily_return: 0.1,
            open_close_rate: None,
            cumulative_return: 0.1,
            moving_average_5d: 0.0,
            volatility_5d: 0.0,
        };
        stage_enriched(&path, &[enriched]).unwrap().commit().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], ENRICHED_HEADER);
        assert_eq!(
            lines[1],
            "01/03/2023,98.5000,,,110.0000,,1000,3,Enero,2023,0.1000,0.1000,,0.0000,0.0000"
        );
    }

    #[test]
    fn test_staged_file_replaces_only_on_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        fs::write(&path, "previous").unwrap();

        let staged = stage_history(&path, &[record(2023, 1, 2, Some(dec!(100)))]).unwrap();
        assert_eq!(staged.path(), path.as_path());
        assert!(dir.path().join("history.csv.tmp").exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");

        drop(staged);
        assert!(!dir.path().join("history.csv.tmp").exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");

        let staged = stage_history(&path, &[record(2023, 1, 2, Some(dec!(100)))]).unwrap();
        assert_eq!(staged.commit().unwrap(), 1);
        assert!(fs::read_to_string(&path).unwrap().starts_with(HISTORY_HEADER));
        assert!(!dir.path().join("history.csv.tmp").exists());
    }

    #[test]
    fn test_stage_into_unwritable_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = stage_enriched(&blocker.join("enriched.csv"), &[]).unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
    }

    #[test]
    fn test_parse_table_keeps_empty_cells() {
        let rows = parse_table("date,close,volume\r\n01/02/2023,100.00,\r\n\r\n01/03/2023,1\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("close"), Some("100.00"));
        assert_eq!(rows[0].get("volume"), Some(""));
    }

    #[test]
    fn test_parse_table_without_header() {
        assert!(matches!(parse_table("\n\n"), Err(DataError::ParseError(_))));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_table(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DataError::Io(_)));
    }
}
