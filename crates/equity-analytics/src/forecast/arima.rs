//! ARIMA(1,1,1) 모델.
//!
//! 1차 차분한 시계열 `y_t = x_t - x_{t-1}`에 평균 μ를 갖는 ARMA(1,1)을 적합합니다.
//!
//! ```text
//! (y_t - μ) = φ (y_{t-1} - μ) + θ e_{t-1} + e_t
//! ```
//!
//! ## 추정
//! 조건부 제곱합(CSS)을 최소화합니다. μ는 차분 평균으로 고정하고, (φ, θ)는
//! (-0.99, 0.99) 범위의 격자 탐색 후 패턴 탐색으로 정밀화합니다.
//! 탐색 스텝이 허용 오차 아래로 줄어들면 수렴으로 봅니다.
//!
//! 차분이 백색 잡음에 가까우면 φ = -θ 능선을 따라 CSS가 거의 평평합니다.
//! 상대 개선량이 미미한 이동은 받아들이지 않고, 스텝 크기마다 이동 횟수를
//! 제한하므로 탐색은 항상 유한한 반복 안에 끝납니다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalyticsError, AnalyticsResult};

/// 적합에 필요한 최소 관측치 수.
pub const MIN_OBSERVATIONS: usize = 3;

/// 계수 탐색 경계 (정상성/가역성).
const COEFFICIENT_BOUND: f64 = 0.99;
/// 격자 탐색 간격.
const GRID_STEP: f64 = 0.1;
/// 패턴 탐색 종료 스텝.
const TOLERANCE: f64 = 1e-6;
/// 스텝 크기별 최대 이동 횟수. 넘으면 스텝을 줄입니다.
const MAX_MOVES_PER_STEP: usize = 200;
/// 이동으로 인정하는 최소 상대 개선량.
const MIN_RELATIVE_IMPROVEMENT: f64 = 1e-12;

/// ARIMA 차수.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR 차수
    pub p: usize,
    /// 차분 차수
    pub d: usize,
    /// MA 차수
    pub q: usize,
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self { p: 1, d: 1, q: 1 }
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// 적합된 ARIMA(1,1,1) 모델.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArimaModel {
    pub order: ArimaOrder,
    /// AR 계수 φ
    pub phi: f64,
    /// MA 계수 θ
    pub theta: f64,
    /// 차분 평균 μ
    pub mu: f64,
    /// 잔차 분산
    pub sigma2: f64,
    pub aic: f64,
    pub bic: f64,
    /// 적합에 사용된 관측치 수
    pub n_obs: usize,
    /// 마지막 관측값 (수준)
    pub last_observation: f64,
    /// 마지막 차분값
    pub last_diff: f64,
    /// 마지막 잔차
    pub last_residual: f64,
    /// 수준 기준 적합값. `series[1..]`과 정렬되며 길이는 `n_obs - 1`
    pub fitted: Vec<f64>,
}

impl ArimaModel {
    /// 관측 시계열에 모델을 적합합니다.
    pub fn fit(series: &[f64]) -> AnalyticsResult<Self> {
        if series.len() < MIN_OBSERVATIONS {
            return Err(AnalyticsError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: series.len(),
            });
        }
        if let Some(position) = series.iter().position(|v| !v.is_finite()) {
            return Err(AnalyticsError::InvalidInput(format!(
                "non-finite observation at index {}",
                position
            )));
        }

        let diffs = difference(series);
        let mu = diffs.iter().sum::<f64>() / diffs.len() as f64;
        let centered: Vec<f64> = diffs.iter().map(|y| y - mu).collect();

        let (phi, theta, css, moves) = minimize_css(&centered)?;

        let residuals = residuals(&centered, phi, theta);
        let m = residuals.len() as f64;
        let sigma2 = css / m;
        if !phi.is_finite() || !theta.is_finite() || !mu.is_finite() || !sigma2.is_finite() {
            return Err(AnalyticsError::NotConverged(
                "non-finite parameter estimate".to_string(),
            ));
        }

        // 가우시안 조건부 로그우도, 파라미터 k = (φ, θ, μ, σ²)
        let k = 4.0;
        let log_likelihood =
            -0.5 * m * (1.0 + (2.0 * std::f64::consts::PI * sigma2.max(f64::MIN_POSITIVE)).ln());
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * m.ln();

        let fitted = series[..series.len() - 1]
            .iter()
            .zip(diffs.iter().zip(&residuals))
            .map(|(previous, (y, e))| previous + y - e)
            .collect();

        debug!(phi, theta, mu, sigma2, moves, "ARIMA fit converged");

        Ok(Self {
            order: ArimaOrder::default(),
            phi,
            theta,
            mu,
            sigma2,
            aic,
            bic,
            n_obs: series.len(),
            last_observation: series[series.len() - 1],
            last_diff: diffs[diffs.len() - 1],
            last_residual: residuals[residuals.len() - 1],
            fitted,
        })
    }

    /// 차분 방정식의 상수항 c = μ(1 - φ).
    pub fn constant(&self) -> f64 {
        self.mu * (1.0 - self.phi)
    }

    /// 시계열 끝 이후 `steps`개의 점 예측.
    ///
    /// 차분을 예측한 뒤 마지막 관측값에서 누적해 수준으로 되돌립니다.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let mut previous = self.last_diff - self.mu;
        let mut shock = self.last_residual;

        let diffs: Vec<f64> = (0..steps)
            .map(|_| {
                let centered = self.phi * previous + self.theta * shock;
                previous = centered;
                // 미래 잔차의 기댓값은 0
                shock = 0.0;
                self.mu + centered
            })
            .collect();

        integrate(&diffs, self.last_observation)
    }

    /// 모델 요약.
    pub fn summary(&self) -> String {
        format!(
            "{} phi={:.6} theta={:.6} const={:.6} sigma2={:.6} aic={:.2} bic={:.2} n={}",
            self.order,
            self.phi,
            self.theta,
            self.constant(),
            self.sigma2,
            self.aic,
            self.bic,
            self.n_obs
        )
    }
}

/// 1차 차분.
pub fn difference(series: &[f64]) -> Vec<f64> {
    series.windows(2).map(|w| w[1] - w[0]).collect()
}

/// 초기값에서 차분을 누적해 수준으로 되돌립니다.
pub fn integrate(diffs: &[f64], start: f64) -> Vec<f64> {
    let mut level = start;
    diffs
        .iter()
        .map(|d| {
            level += d;
            level
        })
        .collect()
}

/// 중심화된 차분의 CSS 잔차. 사전 표본값은 0으로 둡니다.
fn residuals(centered: &[f64], phi: f64, theta: f64) -> Vec<f64> {
    let mut residuals = Vec::with_capacity(centered.len());
    let mut previous = 0.0;
    let mut shock = 0.0;

    for &z in centered {
        let e = z - phi * previous - theta * shock;
        residuals.push(e);
        previous = z;
        shock = e;
    }

    residuals
}

fn css(centered: &[f64], phi: f64, theta: f64) -> f64 {
    residuals(centered, phi, theta).iter().map(|e| e * e).sum()
}

fn in_bounds(value: f64) -> bool {
    value.abs() <= COEFFICIENT_BOUND
}

/// (φ, θ, CSS, 이동 횟수)
fn minimize_css(centered: &[f64]) -> AnalyticsResult<(f64, f64, f64, usize)> {
    // 격자 탐색. 동률이면 (0, 0)에 가까운 시작점을 유지
    let mut best = (0.0, 0.0, css(centered, 0.0, 0.0));
    let grid: Vec<f64> = (-9..=9).map(|i| i as f64 * GRID_STEP).collect();
    for &phi in &grid {
        for &theta in &grid {
            let value = css(centered, phi, theta);
            if value < best.2 {
                best = (phi, theta, value);
            }
        }
    }

    if !best.2.is_finite() {
        return Err(AnalyticsError::NotConverged(
            "sum of squares is not finite".to_string(),
        ));
    }

    // 패턴 탐색
    let (mut phi, mut theta, mut value) = best;
    let mut step = GRID_STEP / 2.0;
    let mut moves = 0;
    let mut moves_at_step = 0;
    let directions = [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)];

    while step >= TOLERANCE {
        let threshold = value - MIN_RELATIVE_IMPROVEMENT * value.abs();
        let next = if moves_at_step < MAX_MOVES_PER_STEP {
            directions
                .iter()
                .map(|(dp, dt)| (phi + dp * step, theta + dt * step))
                .filter(|(p, t)| in_bounds(*p) && in_bounds(*t))
                .map(|(p, t)| (p, t, css(centered, p, t)))
                .find(|(_, _, candidate)| *candidate < threshold)
        } else {
            None
        };

        match next {
            Some((p, t, candidate)) => {
                phi = p;
                theta = t;
                value = candidate;
                moves += 1;
                moves_at_step += 1;
            }
            None => {
                step /= 2.0;
                moves_at_step = 0;
            }
        }
    }

    Ok((phi, theta, value, moves))
}
