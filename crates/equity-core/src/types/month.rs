//! 월 이름 현지화.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

const SPANISH_MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

const ENGLISH_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// 지표 데이터셋의 `month_name` 언어.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthLocale {
    /// 스페인어 (기본값, 원본 데이터셋 규약)
    #[default]
    Spanish,
    /// 영어
    English,
}

impl MonthLocale {
    /// 월 번호(1-12)에 해당하는 이름을 반환합니다.
    ///
    /// 범위를 벗어난 번호는 빈 문자열을 반환합니다.
    pub fn month_name(&self, month: u32) -> &'static str {
        let names = match self {
            MonthLocale::Spanish => &SPANISH_MONTHS,
            MonthLocale::English => &ENGLISH_MONTHS,
        };
        match month {
            1..=12 => names[(month - 1) as usize],
            _ => "",
        }
    }
}

impl FromStr for MonthLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "es" | "spanish" | "español" => Ok(Self::Spanish),
            "en" | "english" => Ok(Self::English),
            _ => Err(format!("Unknown month locale: {}", s)),
        }
    }
}
