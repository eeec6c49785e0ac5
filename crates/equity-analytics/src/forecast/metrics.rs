//! 적합 진단 지표.

use serde::{Deserialize, Serialize};

/// 적합값과 실제값 사이의 오차 지표.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    /// 비교한 관측치 수
    pub n: usize,
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// 결정계수. 실제값 분산이 0이면 `None`
    pub r2: Option<f64>,
    /// Mean Absolute Percentage Error (%). 실제값 0은 제외, 전부 0이면 `None`
    pub mape: Option<f64>,
}

/// 실제값과 적합값을 꼬리 기준으로 정렬해 오차 지표를 계산합니다.
///
/// 길이가 다르면 두 시퀀스의 마지막 `min(len)`개를 비교합니다.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Option<FitDiagnostics> {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return None;
    }

    let actual = &actual[actual.len() - n..];
    let predicted = &predicted[predicted.len() - n..];
    let count = n as f64;

    let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / count;
    let mse = errors.iter().map(|e| e * e).sum::<f64>() / count;

    let mean = actual.iter().sum::<f64>() / count;
    let total = actual.iter().map(|a| (a - mean).powi(2)).sum::<f64>();
    let r2 = (total > 0.0).then(|| 1.0 - errors.iter().map(|e| e * e).sum::<f64>() / total);

    let ratios: Vec<f64> = actual
        .iter()
        .zip(&errors)
        .filter(|(a, _)| **a != 0.0)
        .map(|(a, e)| (e / a).abs())
        .collect();
    let mape = (!ratios.is_empty()).then(|| ratios.iter().sum::<f64>() / ratios.len() as f64 * 100.0);

    Some(FitDiagnostics {
        n,
        mae,
        mse,
        rmse: mse.sqrt(),
        r2,
        mape,
    })
}
