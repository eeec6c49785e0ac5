//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 소스에 접근할 수 없거나 예상한 형태가 아님 (테이블 없음 등)
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// HTTP 요청 오류
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 파일 입출력 오류
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 파싱 오류 (파일 형식 수준)
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl DataError {
    /// 재시도하면 성공할 수 있는 오류인지 확인합니다.
    ///
    /// 파이프라인은 내부적으로 재시도하지 않으며, 호출자가 판단에 사용합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DataError::Http(_) | DataError::SourceUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
