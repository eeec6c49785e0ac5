//! 시계열 예측 모듈.
//!
//! - `arima`: ARIMA(1,1,1) 적합 및 점 예측
//! - `artifact`: 모델 아티팩트 저장소 (reader/writer 분리)
//! - `manager`: 적합 → 저장 → 재로딩 → 예측 수명 주기
//! - `metrics`: 적합 진단 지표 (MAE, RMSE, R², MAPE)

pub mod arima;
pub mod artifact;
pub mod manager;
pub mod metrics;

pub use arima::{ArimaModel, ArimaOrder, MIN_OBSERVATIONS};
pub use artifact::{ArtifactReader, ArtifactStore, ArtifactWriter, ModelArtifact};
pub use manager::{adjusted_close_series, ForecastModelManager};
pub use metrics::{evaluate, FitDiagnostics};
