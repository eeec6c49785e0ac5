//! 적합 진단 명령어.
//!
//! 저장된 정규화 데이터셋의 수정 종가와 모델 적합값을 비교합니다.

use tracing::warn;

use equity_analytics::{adjusted_close_series, FitDiagnostics, ForecastModelManager};
use equity_core::AppConfig;
use equity_data::{normalize, read_table};

/// 진단 지표 계산. 데이터셋이나 모델이 없으면 `None`입니다.
pub fn compute_metrics(config: &AppConfig) -> Option<FitDiagnostics> {
    let history_path = config.storage.history_path();
    let rows = match read_table(&history_path) {
        Ok(rows) => rows,
        Err(e) => {
            warn!(path = %history_path.display(), error = %e, "History dataset not available");
            return None;
        }
    };

    let series = adjusted_close_series(&normalize(&rows));
    ForecastModelManager::from_config(&config.storage).diagnostics(&series)
}

/// 진단 지표 출력.
pub fn print_metrics(diagnostics: Option<&FitDiagnostics>) {
    let Some(d) = diagnostics else {
        println!("\n진단 지표 없음 (모델 또는 데이터 없음)");
        return;
    };

    let optional = |v: Option<f64>, suffix: &str| {
        v.map(|v| format!("{:.4}{}", v, suffix))
            .unwrap_or_else(|| "-".to_string())
    };

    println!("\n=== 모델 적합 진단 ({}개 관측치) ===", d.n);
    println!("MAE:  {:.4}", d.mae);
    println!("RMSE: {:.4}", d.rmse);
    println!("R²:   {}", optional(d.r2, ""));
    println!("MAPE: {}", optional(d.mape, "%"));
}
