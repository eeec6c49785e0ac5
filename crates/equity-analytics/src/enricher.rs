//! 파생 지표 계산.
//!
//! 정규화 레코드에 달력 필드와 수익률, 5일 이동평균/변동성을 추가합니다.
//!
//! ## 지표
//! - `daily_return`: (종가 - 직전 종가) / 직전 종가. 첫 레코드는 0
//! - `open_close_rate`: (종가 - 시가) / 시가. 시가가 0이거나 없으면 `None`
//! - `cumulative_return`: Π(1 + daily_return) - 1
//! - `moving_average_5d`, `volatility_5d`: 최근 5개 레코드의 평균과 표본 표준편차
//!
//! 결측값 처리:
//! - 종가가 없는 레코드의 `daily_return`은 0이며, 다음 레코드는 마지막으로 존재한
//!   종가와 비교합니다.
//! - 창 안에 결측 종가가 하나라도 있으면 이동평균/변동성은 0입니다.
//! - 처음 4개 레코드는 창이 채워지지 않아 0으로 채웁니다. 0은 실제 값과 구분되지
//!   않으므로 차트 등 소비자는 처음 4개 레코드를 무시해야 합니다.

use std::borrow::Cow;
use std::collections::VecDeque;

use chrono::Datelike;
use tracing::{debug, warn};

use equity_core::{CanonicalRecord, EnrichedRecord, MonthLocale};

/// 이동 창 크기.
pub const WINDOW: usize = 5;

/// 지표를 계산한 레코드 시퀀스를 반환합니다.
///
/// 입력이 날짜순이 아니면 정렬한 복사본으로 계산합니다. 입력은 변경되지 않습니다.
pub fn enrich(records: &[CanonicalRecord], locale: MonthLocale) -> Vec<EnrichedRecord> {
    if records.is_empty() {
        warn!("No records to enrich");
        return Vec::new();
    }

    let ordered: Cow<'_, [CanonicalRecord]> =
        if records.windows(2).all(|w| w[0].date <= w[1].date) {
            Cow::Borrowed(records)
        } else {
            warn!(records = records.len(), "Input not ordered by date, sorting before enrichment");
            let mut sorted = records.to_vec();
            sorted.sort_by_key(|r| r.date);
            Cow::Owned(sorted)
        };

    let mut window: VecDeque<Option<f64>> = VecDeque::with_capacity(WINDOW);
    let mut previous_close: Option<f64> = None;
    let mut growth = 1.0;
    let mut enriched = Vec::with_capacity(ordered.len());

    for record in ordered.iter() {
        let close = record.close_f64();

        let daily_return = match (close, previous_close) {
            (Some(current), Some(previous)) if previous != 0.0 => (current - previous) / previous,
            _ => 0.0,
        };
        growth *= 1.0 + daily_return;
        if close.is_some() {
            previous_close = close;
        }

        if window.len() == WINDOW {
            window.pop_front();
        }
        window.push_back(close);
        let (moving_average_5d, volatility_5d) = window_stats(&window);

        let date = record.date;
        enriched.push(EnrichedRecord {
            record: record.clone(),
            day: date.day(),
            month_name: locale.month_name(date.month()).to_string(),
            year: date.year(),
            year_month: date.format("%Y-%m").to_string(),
            daily_return,
            open_close_rate: open_close_rate(record),
            cumulative_return: growth - 1.0,
            moving_average_5d,
            volatility_5d,
        });
    }

    debug!(
        records = enriched.len(),
        cumulative_return = growth - 1.0,
        "Enriched records"
    );

    enriched
}

fn open_close_rate(record: &CanonicalRecord) -> Option<f64> {
    let open = record.open_f64()?;
    let close = record.close_f64()?;
    if open == 0.0 {
        return None;
    }
    Some((close - open) / open)
}

/// 꽉 찬 창의 (평균, 표본 표준편차). 창이 덜 찼거나 결측이 있으면 (0, 0).
fn window_stats(window: &VecDeque<Option<f64>>) -> (f64, f64) {
    if window.len() < WINDOW {
        return (0.0, 0.0);
    }

    let values: Option<Vec<f64>> = window.iter().copied().collect();
    let Some(values) = values else {
        return (0.0, 0.0);
    };

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    (mean, variance.sqrt())
}
