//! 모델 아티팩트 저장소.
//!
//! 적합된 모델은 고정 경로의 JSON 파일 하나로 저장되며, 적합할 때마다 덮어씁니다.
//! 접근 권한은 분리되어 있습니다: 읽기는 [`ArtifactReader`], 쓰기는
//! [`ArtifactWriter`]를 통해서만 가능하며 writer는 저장소를 가변 대여합니다.
//!
//! 동시 쓰기는 지원하지 않습니다 (프로세스당 한 writer 가정).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::arima::ArimaModel;
use crate::error::{AnalyticsError, AnalyticsResult};

/// 저장된 모델과 적합 시각.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model: ArimaModel,
    pub fitted_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn new(model: ArimaModel) -> Self {
        Self {
            model,
            fitted_at: Utc::now(),
        }
    }
}

/// 모델 아티팩트 저장소.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 아티팩트 존재 여부.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// 읽기 전용 핸들.
    pub fn reader(&self) -> ArtifactReader<'_> {
        ArtifactReader { path: &self.path }
    }

    /// 쓰기 핸들. 살아 있는 동안 같은 저장소의 reader를 만들 수 없습니다.
    pub fn writer(&mut self) -> ArtifactWriter<'_> {
        ArtifactWriter { path: &self.path }
    }
}

/// 아티팩트 읽기 핸들.
#[derive(Debug)]
pub struct ArtifactReader<'a> {
    path: &'a Path,
}

impl ArtifactReader<'_> {
    /// 가장 최근에 저장된 아티팩트를 읽습니다.
    pub fn load(&self) -> AnalyticsResult<ModelArtifact> {
        if !self.path.is_file() {
            return Err(AnalyticsError::ArtifactMissing(
                self.path.display().to_string(),
            ));
        }

        let bytes = fs::read(self.path)?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;

        debug!(
            path = %self.path.display(),
            fitted_at = %artifact.fitted_at,
            "Loaded model artifact"
        );
        Ok(artifact)
    }
}

/// 아티팩트 쓰기 핸들.
#[derive(Debug)]
pub struct ArtifactWriter<'a> {
    path: &'a Path,
}

impl ArtifactWriter<'_> {
    /// 아티팩트를 저장합니다. 임시 파일에 쓴 뒤 이름을 바꾸므로
    /// 실패해도 기존 아티팩트는 그대로 남습니다.
    pub fn save(&self, artifact: &ModelArtifact) -> AnalyticsResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let bytes = serde_json::to_vec_pretty(artifact)?;
        let tmp_path = self.path.with_extension(format!(
            "{}.tmp",
            self.path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
        ));

        let result = fs::write(&tmp_path, &bytes).and_then(|_| fs::rename(&tmp_path, self.path));
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result?;

        info!(path = %self.path.display(), bytes = bytes.len(), "Saved model artifact");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> ArimaModel {
        ArimaModel::fit(&[100.0, 101.5, 101.0, 103.0, 104.5, 104.0]).unwrap()
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("models").join("arima_model.json"));

        assert!(!store.exists());
        let err = store.reader().load().unwrap_err();
        assert!(matches!(err, AnalyticsError::ArtifactMissing(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ArtifactStore::new(dir.path().join("models").join("arima_model.json"));

        let artifact = ModelArtifact::new(model());
        store.writer().save(&artifact).unwrap();

        assert!(store.exists());
        assert!(!dir.path().join("models").join("arima_model.json.tmp").exists());
        let loaded = store.reader().load().unwrap();
        assert_eq!(loaded, artifact);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ArtifactStore::new(dir.path().join("arima_model.json"));

        store.writer().save(&ModelArtifact::new(model())).unwrap();
        let second = ArimaModel::fit(&[1.0, 2.0, 4.0, 7.0]).unwrap();
        store.writer().save(&ModelArtifact::new(second.clone())).unwrap();

        assert_eq!(store.reader().load().unwrap().model, second);
    }

    #[test]
    fn test_corrupt_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arima_model.json");
        fs::write(&path, b"not json").unwrap();

        let err = ArtifactStore::new(&path).reader().load().unwrap_err();
        assert!(matches!(err, AnalyticsError::Serialization(_)));
        assert!(err.requires_refit());
    }
}
