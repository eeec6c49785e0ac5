//! 지표 계산 및 예측 모델.
//!
//! 이 crate는 다음을 제공합니다:
//! - 정규화 레코드의 파생 지표 계산 (수익률, 이동평균, 변동성)
//! - ARIMA(1,1,1) 예측 모델의 적합, 저장, 재로딩, 예측
//! - 적합 진단 지표

pub mod enricher;
pub mod error;
pub mod forecast;

pub use enricher::enrich;
pub use error::{AnalyticsError, AnalyticsResult};
pub use forecast::{
    adjusted_close_series, ArimaModel, ArtifactStore, FitDiagnostics, ForecastModelManager,
    ModelArtifact,
};
