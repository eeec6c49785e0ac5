//! 예측 명령어.

use tracing::info;

use equity_analytics::ForecastModelManager;
use equity_core::AppConfig;

/// 저장된 모델로 `steps`개의 점 예측을 만듭니다. 실패하면 빈 벡터입니다.
pub fn predict(config: &AppConfig, steps: usize) -> Vec<f64> {
    let manager = ForecastModelManager::from_config(&config.storage);
    let values = manager.forecast(steps);
    info!(steps, produced = values.len(), "Forecast requested");
    values
}

/// 예측 결과 출력.
pub fn print_forecast(steps: usize, values: &[f64]) {
    if values.is_empty() {
        println!("\n예측 결과 없음 (모델 미적합 또는 잘못된 스텝 수: {})", steps);
        return;
    }

    println!("\n{}스텝 예측:", values.len());
    for (i, value) in values.iter().enumerate() {
        println!("  t+{:<3} {:>12.4}", i + 1, value);
    }
}
