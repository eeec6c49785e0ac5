//! 원시 행, 정규화 레코드, 지표 레코드.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CanonicalField;

/// 데이터 소스가 반환하는 원시 행.
///
/// 컬럼 라벨(로케일 의존) → 문자열 값의 매핑이며, 소스의 컬럼 순서를 유지합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    /// 빈 행 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 셀 추가 (빌더 형태).
    pub fn with(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(label, value);
        self
    }

    /// 셀 추가.
    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.cells.push((label.into(), value.into()));
    }

    /// 라벨로 값 조회 (처음 일치하는 셀).
    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    /// 소스 순서대로 셀을 순회합니다.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 정규화된 거래일 레코드.
///
/// 날짜 파싱에 성공한 행만 레코드가 됩니다. 숫자 필드는 파싱 실패 시 `None`입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Option<Decimal>,
    /// 고가
    pub high: Option<Decimal>,
    /// 저가
    pub low: Option<Decimal>,
    /// 종가
    pub close: Option<Decimal>,
    /// 수정 종가
    pub adjusted_close: Option<Decimal>,
    /// 거래량
    pub volume: Option<u64>,
    /// 인식되지 않은 소스 컬럼 (원본 그대로 보존)
    #[serde(default)]
    pub passthrough: Vec<(String, String)>,
}

impl CanonicalRecord {
    /// 날짜만 채워진 레코드 생성.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: None,
            adjusted_close: None,
            volume: None,
            passthrough: Vec::new(),
        }
    }

    /// 표준 필드 전체가 같은지 비교합니다 (passthrough 제외).
    pub fn same_canonical_fields(&self, other: &Self) -> bool {
        self.date == other.date
            && self.open == other.open
            && self.high == other.high
            && self.low == other.low
            && self.close == other.close
            && self.adjusted_close == other.adjusted_close
            && self.volume == other.volume
    }

    /// 숫자 필드 값을 Decimal로 반환합니다. 거래량은 정수에서 변환됩니다.
    pub fn decimal(&self, field: CanonicalField) -> Option<Decimal> {
        match field {
            CanonicalField::Date => None,
            CanonicalField::Open => self.open,
            CanonicalField::High => self.high,
            CanonicalField::Low => self.low,
            CanonicalField::Close => self.close,
            CanonicalField::AdjustedClose => self.adjusted_close,
            CanonicalField::Volume => self.volume.map(Decimal::from),
        }
    }

    /// 종가 (f64).
    pub fn close_f64(&self) -> Option<f64> {
        self.close.and_then(|v| v.to_f64())
    }

    /// 시가 (f64).
    pub fn open_f64(&self) -> Option<f64> {
        self.open.and_then(|v| v.to_f64())
    }

    /// 수정 종가 (f64).
    pub fn adjusted_close_f64(&self) -> Option<f64> {
        self.adjusted_close.and_then(|v| v.to_f64())
    }
}

/// 파생 지표가 추가된 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    /// 원본 정규화 레코드 (변경되지 않음)
    pub record: CanonicalRecord,
    /// 일
    pub day: u32,
    /// 월 이름 (현지화)
    pub month_name: String,
    /// 연도
    pub year: i32,
    /// 연-월 구간 라벨 (`YYYY-MM`)
    pub year_month: String,
    /// 전일 대비 종가 수익률 (첫 레코드는 0)
    pub daily_return: f64,
    /// (종가 - 시가) / 시가. 시가가 0이거나 없으면 `None`
    pub open_close_rate: Option<f64>,
    /// 누적 수익률
    pub cumulative_return: f64,
    /// 5일 이동평균 (정의되지 않는 구간은 0)
    pub moving_average_5d: f64,
    /// 5일 표본 표준편차 (정의되지 않는 구간은 0)
    pub volatility_5d: f64,
}

impl EnrichedRecord {
    /// 거래일.
    pub fn date(&self) -> NaiveDate {
        self.record.date
    }
}
