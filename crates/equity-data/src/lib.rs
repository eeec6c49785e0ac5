//! 시세 이력 수집, 정규화 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - 원시 행 소스 추상화 및 HTML 과거 시세 테이블 수집기
//! - 로케일 헤더 매핑, 숫자/날짜 변환을 포함한 정규화
//! - 정규화/지표 데이터셋 CSV 저장 및 재로딩

pub mod error;
pub mod normalizer;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};
pub use normalizer::{
    canonical_field, normalize, normalize_header, parse_date, parse_price, parse_volume,
    to_raw_rows, DATE_FORMAT, HEADER_ALIASES,
};
pub use provider::{collect, CsvFileSource, HistoryTableSource, RawRecordSource};
pub use storage::{read_table, stage_enriched, stage_history, StagedFile};
