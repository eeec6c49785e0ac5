//! CSV 파일 소스.
//!
//! 저장된 정규화/지표 CSV나 외부에서 받은 CSV를 원시 행으로 읽습니다.
//! 네트워크 없이 파이프라인을 다시 돌릴 때 사용합니다.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use equity_core::RawRow;

use super::RawRecordSource;
use crate::error::Result;
use crate::storage::parse_table;

/// CSV 파일 기반 원시 행 소스.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RawRecordSource for CsvFileSource {
    fn name(&self) -> &str {
        "csv_file"
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        parse_table(&content)
    }
}
