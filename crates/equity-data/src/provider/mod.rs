//! 원시 행 소스 모듈.
//!
//! 파이프라인 입력은 [`RawRecordSource`] trait 뒤에 있습니다.
//!
//! ## 구현
//! - `HistoryTableSource`: 과거 시세 HTML 페이지의 테이블 스크래핑
//! - `CsvFileSource`: 이미 저장된 CSV 파일에서 재로딩 (오프라인 실행)

pub mod csv_file;
pub mod history_table;

pub use csv_file::CsvFileSource;
pub use history_table::{parse_history_table, HistoryTableSource};

use async_trait::async_trait;
use tracing::{error, info};

use equity_core::RawRow;

use crate::error::Result;

/// 원시 행 소스 trait.
///
/// 행 순서나 중복에 대한 보장은 없습니다. 정렬과 정리는 normalizer가 담당합니다.
#[async_trait]
pub trait RawRecordSource: Send + Sync {
    /// 소스 이름 (로그용).
    fn name(&self) -> &str;

    /// 원시 행 조회.
    async fn fetch_rows(&self) -> Result<Vec<RawRow>>;
}

/// 소스에서 원시 행을 수집합니다.
///
/// 실패하면 원인을 한 번 `error!`로 기록하고 빈 벡터를 반환합니다.
pub async fn collect<S>(source: &S) -> Vec<RawRow>
where
    S: RawRecordSource + ?Sized,
{
    match source.fetch_rows().await {
        Ok(rows) => {
            info!(source = source.name(), rows = rows.len(), "Collected raw rows");
            rows
        }
        Err(e) => {
            error!(
                source = source.name(),
                error = %e,
                retryable = e.is_retryable(),
                "Failed to collect raw rows"
            );
            Vec::new()
        }
    }
}
