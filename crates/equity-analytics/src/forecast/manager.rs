//! 예측 모델 수명 주기 관리.
//!
//! `absent → fitted(저장) → 예측 가능 → 재적합(덮어쓰기) → …`
//!
//! `try_*` 메서드는 실패 원인을 `AnalyticsError`로 돌려주고, `fit`/`forecast`는
//! 원인을 한 번 로그로 남긴 뒤 `false`/빈 벡터로 처리합니다.

use std::path::PathBuf;

use tracing::{error, info, warn};

use equity_core::{CanonicalRecord, StorageConfig};

use super::arima::ArimaModel;
use super::artifact::{ArtifactStore, ModelArtifact};
use super::metrics::{evaluate, FitDiagnostics};
use crate::error::{AnalyticsError, AnalyticsResult};

/// 정렬된 레코드에서 결측을 제외한 수정 종가 시계열을 추출합니다.
pub fn adjusted_close_series(records: &[CanonicalRecord]) -> Vec<f64> {
    records
        .iter()
        .filter_map(CanonicalRecord::adjusted_close_f64)
        .collect()
}

/// 예측 모델 관리자.
#[derive(Debug, Clone)]
pub struct ForecastModelManager {
    store: ArtifactStore,
}

impl ForecastModelManager {
    /// 아티팩트 경로로 관리자를 생성합니다.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            store: ArtifactStore::new(model_path),
        }
    }

    /// 저장소 설정의 모델 경로를 사용합니다.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.model_path())
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// 모델을 적합하고 아티팩트를 덮어씁니다.
    ///
    /// 실패하면 기존 아티팩트는 변경되지 않습니다.
    pub fn try_fit(&mut self, series: &[f64]) -> AnalyticsResult<ArimaModel> {
        let model = ArimaModel::fit(series)?;
        let artifact = ModelArtifact::new(model);
        self.store.writer().save(&artifact)?;

        info!(
            observations = series.len(),
            path = %self.store.path().display(),
            summary = %artifact.model.summary(),
            "Model fitted"
        );
        Ok(artifact.model)
    }

    /// 모델 적합. 성공 여부만 반환합니다.
    pub fn fit(&mut self, series: &[f64]) -> bool {
        match self.try_fit(series) {
            Ok(_) => true,
            Err(e) => {
                error!(
                    error = %e,
                    observations = series.len(),
                    recoverable = e.is_recoverable(),
                    "Model fit failed"
                );
                false
            }
        }
    }

    /// 가장 최근 아티팩트를 읽습니다.
    pub fn load(&self) -> AnalyticsResult<ModelArtifact> {
        self.store.reader().load()
    }

    /// `steps`개의 점 예측. 아티팩트는 읽기만 합니다.
    pub fn try_forecast(&self, steps: usize) -> AnalyticsResult<Vec<f64>> {
        if steps == 0 {
            return Err(AnalyticsError::InvalidInput(
                "forecast steps must be positive".to_string(),
            ));
        }

        let artifact = self.load()?;
        Ok(artifact.model.forecast(steps))
    }

    /// 점 예측. 실패하면 빈 벡터입니다.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        match self.try_forecast(steps) {
            Ok(values) => values,
            Err(e) if e.requires_refit() => {
                warn!(
                    error = %e,
                    path = %self.store.path().display(),
                    "No usable fitted model, run the pipeline to refit"
                );
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, steps, "Forecast failed");
                Vec::new()
            }
        }
    }

    /// 저장된 적합값과 실제 시계열을 비교한 진단 지표.
    ///
    /// 아티팩트가 없거나 비교할 데이터가 없으면 `None`입니다.
    pub fn diagnostics(&self, actual: &[f64]) -> Option<FitDiagnostics> {
        let artifact = match self.load() {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(error = %e, "Cannot compute fit diagnostics");
                return None;
            }
        };

        let diagnostics = evaluate(actual, &artifact.model.fitted);
        if diagnostics.is_none() {
            warn!(
                actual = actual.len(),
                fitted = artifact.model.fitted.len(),
                "No data to compare against fitted values"
            );
        }
        diagnostics
    }
}
