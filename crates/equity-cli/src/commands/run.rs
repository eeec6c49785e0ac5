//! 파이프라인 실행 명령어.
//!
//! 수집 → 정규화 → 정규화 데이터셋 저장 → 지표 계산 → 지표 데이터셋 저장 → 모델 적합

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use equity_analytics::{adjusted_close_series, enrich, ForecastModelManager};
use equity_core::{AppConfig, CanonicalRecord, EnrichedRecord, RawRow};
use equity_data::{
    collect, normalize, stage_enriched, stage_history, CsvFileSource, HistoryTableSource,
};

/// 미리보기 행 수.
const PREVIEW_ROWS: usize = 5;

/// 실행 결과 요약.
#[derive(Debug)]
pub struct RunSummary {
    /// 수집된 원시 행 수
    pub raw_rows: usize,
    /// 정규화 레코드
    pub records: Vec<CanonicalRecord>,
    /// 지표 레코드
    pub enriched: Vec<EnrichedRecord>,
    /// 정규화 데이터셋 경로 (저장하지 않았으면 `None`)
    pub history_path: Option<PathBuf>,
    /// 지표 데이터셋 경로
    pub enriched_path: Option<PathBuf>,
    /// 모델 적합 성공 여부
    pub model_fitted: bool,
}

/// 소스에서 원시 행을 수집해 파이프라인을 실행합니다.
///
/// `input`이 있으면 해당 CSV를, 없으면 설정된 웹 페이지를 읽습니다.
pub async fn run_pipeline(config: &AppConfig, input: Option<&Path>) -> anyhow::Result<RunSummary> {
    let rows = match input {
        Some(path) => collect(&CsvFileSource::new(path)).await,
        None => {
            let source = HistoryTableSource::new(&config.source)
                .context("Failed to build history page client")?;
            collect(&source).await
        }
    };

    process_rows(config, &rows)
}

/// 수집된 원시 행으로 나머지 단계를 실행합니다.
///
/// 정규화 결과가 비어 있으면 기존 데이터셋과 모델을 덮어쓰지 않습니다.
pub fn process_rows(config: &AppConfig, rows: &[RawRow]) -> anyhow::Result<RunSummary> {
    let records = normalize(rows);

    if records.is_empty() {
        warn!(raw_rows = rows.len(), "No records to process, existing artifacts left untouched");
        return Ok(RunSummary {
            raw_rows: rows.len(),
            records,
            enriched: Vec::new(),
            history_path: None,
            enriched_path: None,
            model_fitted: false,
        });
    }

    let history_path = config.storage.history_path();
    let staged_history = stage_history(&history_path, &records)
        .with_context(|| format!("Failed to write {}", history_path.display()))?;

    let enriched = enrich(&records, config.enrichment.month_locale);
    let enriched_path = config.storage.enriched_path();
    let staged_enriched = stage_enriched(&enriched_path, &enriched)
        .with_context(|| format!("Failed to write {}", enriched_path.display()))?;

    // 두 데이터셋이 모두 기록된 뒤에만 기존 파일을 교체
    staged_history
        .commit()
        .with_context(|| format!("Failed to replace {}", history_path.display()))?;
    staged_enriched
        .commit()
        .with_context(|| format!("Failed to replace {}", enriched_path.display()))?;

    let mut manager = ForecastModelManager::from_config(&config.storage);
    let model_fitted = manager.fit(&adjusted_close_series(&records));

    info!(
        records = records.len(),
        model_fitted,
        "Pipeline run finished"
    );

    Ok(RunSummary {
        raw_rows: rows.len(),
        records,
        enriched,
        history_path: Some(history_path),
        enriched_path: Some(enriched_path),
        model_fitted,
    })
}

fn cell<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// 실행 결과 출력.
pub fn print_summary(summary: &RunSummary) {
    println!("\n원시 행: {}, 정규화 레코드: {}", summary.raw_rows, summary.records.len());

    match (&summary.history_path, &summary.enriched_path) {
        (Some(history), Some(enriched)) => {
            println!("정규화 데이터 저장: {}", history.display());
            println!("지표 데이터 저장: {}", enriched.display());
        }
        _ => {
            println!("저장할 데이터가 없습니다.");
            return;
        }
    }

    if summary.model_fitted {
        println!("모델 적합 및 저장 완료.");
    } else {
        println!("모델 적합 실패 (로그 참고).");
    }

    println!("\n--- 정규화 데이터 미리보기 ---");
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "date", "open", "high", "low", "close", "adj_close", "volume"
    );
    for record in summary.records.iter().take(PREVIEW_ROWS) {
        println!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12}",
            record.date.format("%m/%d/%Y").to_string(),
            cell(record.open),
            cell(record.high),
            cell(record.low),
            cell(record.close),
            cell(record.adjusted_close),
            cell(record.volume),
        );
    }

    println!("\n--- 지표 데이터 미리보기 ---");
    println!(
        "{:<12} {:>12} {:>12} {:>12} {:>12}",
        "date", "daily_ret", "cum_ret", "ma_5d", "vol_5d"
    );
    for row in summary.enriched.iter().take(PREVIEW_ROWS) {
        println!(
            "{:<12} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
            row.date().format("%m/%d/%Y").to_string(),
            row.daily_return,
            row.cumulative_return,
            row.moving_average_5d,
            row.volatility_5d,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.data_dir = dir.to_path_buf();
        config
    }

    fn rows() -> Vec<RawRow> {
        (0..10)
            .map(|i| {
                RawRow::new()
                    .with("Fecha", format!("01/{:02}/2023", i + 2))
                    .with("Abrir", format!("{}.00", 100 + i))
                    .with("Cerrar", format!("{}.40", 100 + i))
                    .with("cierre_ajustado", format!("{}.{}", 100 + i, (i * 37) % 100))
                    .with("Volumen", "1,000")
            })
            .collect()
    }

    #[test]
    fn test_process_rows_writes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let summary = process_rows(&config, &rows()).unwrap();
        assert_eq!(summary.records.len(), 10);
        assert_eq!(summary.enriched.len(), 10);
        assert!(summary.model_fitted);
        assert!(config.storage.history_path().exists());
        assert!(config.storage.enriched_path().exists());
        assert!(config.storage.model_path().exists());
    }

    #[test]
    fn test_empty_rows_leave_artifacts_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let summary = process_rows(&config, &[]).unwrap();
        assert!(summary.records.is_empty());
        assert!(!summary.model_fitted);
        assert!(summary.history_path.is_none());
        assert!(!config.storage.history_path().exists());
    }

    #[test]
    fn test_failed_enriched_write_keeps_previous_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        std::fs::write(dir.path().join("blocker"), "not a directory").unwrap();
        config.storage.enriched_file = "blocker/enriched.csv".to_string();

        let history_path = config.storage.history_path();
        std::fs::write(&history_path, "previous run").unwrap();

        assert!(process_rows(&config, &rows()).is_err());
        assert_eq!(std::fs::read_to_string(&history_path).unwrap(), "previous run");
        assert!(!dir.path().join("meta_history.csv.tmp").exists());
        assert!(!config.storage.model_path().exists());
    }

    #[tokio::test]
    async fn test_run_from_csv_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let input = dir.path().join("input.csv");
        std::fs::write(
            &input,
            "date,close,adjusted_close\n01/02/2023,100,99\n01/03/2023,110,109\n",
        )
        .unwrap();

        let summary = run_pipeline(&config, Some(input.as_path())).await.unwrap();
        assert_eq!(summary.records.len(), 2);
        // 관측치 2개로는 적합하지 않음
        assert!(!summary.model_fitted);
        assert!(!config.storage.model_path().exists());
    }
}
