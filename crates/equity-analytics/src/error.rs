//! 분석 모듈 에러 타입.

use thiserror::Error;

/// 지표 계산 및 예측 모델에서 발생할 수 있는 에러.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// 적합을 위한 데이터 부족
    #[error("Insufficient data: need {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// 모델 적합이 수렴하지 않음
    #[error("Model did not converge: {0}")]
    NotConverged(String),

    /// 저장된 모델 아티팩트 없음
    #[error("Model artifact not found: {0}")]
    ArtifactMissing(String),

    /// 유효하지 않은 입력 (예: 0 스텝 예측)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 아티팩트 입출력 에러
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 아티팩트 직렬화 에러
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 분석 작업을 위한 Result 타입.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

impl AnalyticsError {
    /// 다른 입력으로 다시 시도하면 성공할 수 있는 에러인지 확인.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AnalyticsError::InsufficientData { .. }
                | AnalyticsError::InvalidInput(_)
                | AnalyticsError::ArtifactMissing(_)
        )
    }

    /// 모델을 다시 적합해야 하는 에러인지 확인.
    pub fn requires_refit(&self) -> bool {
        matches!(
            self,
            AnalyticsError::ArtifactMissing(_) | AnalyticsError::Serialization(_)
        )
    }
}
