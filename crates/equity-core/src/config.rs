//! 설정 관리.
//!
//! 이 모듈은 파이프라인 설정을 정의하고 관리합니다.
//! 기본값 → TOML 파일 → `EQUITY__` 접두사 환경 변수 순으로 덮어씁니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::types::MonthLocale;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 데이터 소스 설정
    #[serde(default)]
    pub source: SourceConfig,
    /// 저장소 경로 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 지표 계산 설정
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    /// 예측 설정
    #[serde(default)]
    pub forecast: ForecastConfig,
}

/// 데이터 소스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 과거 시세 페이지 URL
    pub url: String,
    /// HTTP User-Agent
    pub user_agent: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "https://finance.yahoo.com/quote/META/history/?period1=1337347800&period2=1746921077"
                .to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 30,
        }
    }
}

impl SourceConfig {
    /// 요청 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 저장소 경로 설정.
///
/// 모든 상대 경로는 `data_dir` 기준입니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 데이터 디렉토리
    pub data_dir: PathBuf,
    /// 정규화 데이터셋 파일명
    pub history_file: String,
    /// 지표 데이터셋 파일명
    pub enriched_file: String,
    /// 모델 아티팩트 경로
    pub model_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            history_file: "meta_history.csv".to_string(),
            enriched_file: "meta_data_enricher.csv".to_string(),
            model_file: "models/arima_model.json".to_string(),
        }
    }
}

impl StorageConfig {
    /// 정규화 데이터셋 경로
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }

    /// 지표 데이터셋 경로
    pub fn enriched_path(&self) -> PathBuf {
        self.data_dir.join(&self.enriched_file)
    }

    /// 모델 아티팩트 경로
    pub fn model_path(&self) -> PathBuf {
        self.data_dir.join(&self.model_file)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 로그 파일 디렉토리 (없으면 파일 출력 안 함)
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            dir: None,
        }
    }
}

/// 지표 계산 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// `month_name` 언어
    pub month_locale: MonthLocale,
}

/// 예측 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// 기본 예측 기간 (스텝)
    pub default_steps: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self { default_steps: 5 }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    /// 섹션 일부만 지정하면 나머지 키는 기본값을 따릅니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("EQUITY")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 설정 값 검증.
    pub fn validate(&self) -> CoreResult<()> {
        if self.source.timeout_secs == 0 {
            return Err(CoreError::InvalidInput(
                "source.timeout_secs must be positive".to_string(),
            ));
        }
        if self.forecast.default_steps == 0 {
            return Err(CoreError::InvalidInput(
                "forecast.default_steps must be positive".to_string(),
            ));
        }
        for (key, value) in [
            ("storage.history_file", &self.storage.history_file),
            ("storage.enriched_file", &self.storage.enriched_file),
            ("storage.model_file", &self.storage.model_file),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidInput(format!("{} must not be empty", key)));
            }
        }
        Ok(())
    }
}
