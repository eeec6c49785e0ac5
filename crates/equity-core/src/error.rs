//! 핵심 에러 타입.

use thiserror::Error;

/// 설정 로딩 및 로깅 초기화 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),

    /// 잘못된 설정 값
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 로깅 초기화 에러
    #[error("Logging error: {0}")]
    Logging(String),

    /// 파일 입출력 에러
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
