//! 표준 컬럼 정의.
//!
//! 정규화된 데이터셋의 컬럼 이름과 순서를 고정합니다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 정규화 데이터셋의 표준 필드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    /// 거래일
    Date,
    /// 시가
    Open,
    /// 고가
    High,
    /// 저가
    Low,
    /// 종가
    Close,
    /// 수정 종가
    AdjustedClose,
    /// 거래량
    Volume,
}

impl CanonicalField {
    /// 저장 파일의 컬럼 순서.
    pub const ALL: [CanonicalField; 7] = [
        CanonicalField::Date,
        CanonicalField::Open,
        CanonicalField::High,
        CanonicalField::Low,
        CanonicalField::Close,
        CanonicalField::AdjustedClose,
        CanonicalField::Volume,
    ];

    /// 표준 컬럼 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Date => "date",
            CanonicalField::Open => "open",
            CanonicalField::High => "high",
            CanonicalField::Low => "low",
            CanonicalField::Close => "close",
            CanonicalField::AdjustedClose => "adjusted_close",
            CanonicalField::Volume => "volume",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
