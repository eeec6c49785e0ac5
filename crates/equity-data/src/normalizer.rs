//! 원시 행 정규화.
//!
//! 스크래핑된 원시 행(컬럼 라벨 → 문자열)을 표준 컬럼, 타입이 지정된 값,
//! 날짜 오름차순을 갖는 [`CanonicalRecord`] 시퀀스로 변환합니다.
//!
//! ## 처리 순서
//! 1. 헤더 별칭 테이블([`HEADER_ALIASES`])로 로케일별 헤더를 표준 필드에 매핑
//! 2. 숫자 셀에서 천 단위 구분자, 통화 기호 등 서식 문자 제거
//! 3. 날짜 파싱 (실패한 행은 제외)
//! 4. 숫자 변환 (실패한 셀은 `None`)
//! 5. 표준 필드 전체가 같은 중복 행 제거 (날짜만으로는 제거하지 않음)
//! 6. 날짜 오름차순 정렬
//!
//! ## 숫자 로케일
//! 미국식 표기를 가정합니다: `.`은 소수점, `,`는 천 단위 구분자입니다.
//! 숫자, `.`, `-` 이외의 문자는 모두 제거되며, 제거 후 `.`이 두 개 이상이면 파싱 실패입니다.

use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use equity_core::{CanonicalField, CanonicalRecord, RawRow};

/// 저장 파일 및 원시 행 변환에 사용하는 날짜 형식 (`MM/DD/YYYY`).
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// 헤더 별칭 → 표준 필드 매핑 테이블.
///
/// 비교는 [`normalize_header`]를 양쪽에 적용한 뒤 수행하므로 대소문자,
/// 끝의 `.`/`*`, `_`/`-`/공백 차이는 무시됩니다.
pub const HEADER_ALIASES: &[(&str, CanonicalField)] = &[
    // 날짜
    ("date", CanonicalField::Date),
    ("fecha", CanonicalField::Date),
    // 시가
    ("open", CanonicalField::Open),
    ("abrir", CanonicalField::Open),
    ("apertura", CanonicalField::Open),
    // 고가
    ("high", CanonicalField::High),
    ("alto", CanonicalField::High),
    ("máx", CanonicalField::High),
    ("max", CanonicalField::High),
    ("máximo", CanonicalField::High),
    // 저가
    ("low", CanonicalField::Low),
    ("bajo", CanonicalField::Low),
    ("mín", CanonicalField::Low),
    ("min", CanonicalField::Low),
    ("mínimo", CanonicalField::Low),
    // 종가
    ("close", CanonicalField::Close),
    ("cerrar", CanonicalField::Close),
    ("cerca", CanonicalField::Close),
    ("cierre", CanonicalField::Close),
    ("Close price adjusted for splits.", CanonicalField::Close),
    ("Precio de cierre ajustado por divisiones.", CanonicalField::Close),
    // 수정 종가
    ("adjusted_close", CanonicalField::AdjustedClose),
    ("adj close", CanonicalField::AdjustedClose),
    ("adj_cerrar", CanonicalField::AdjustedClose),
    ("cierre_ajustado", CanonicalField::AdjustedClose),
    (
        "Adjusted close price adjusted for splits and dividend and/or capital gain distributions.",
        CanonicalField::AdjustedClose,
    ),
    (
        "Precio de cierre ajustado por divisiones y distribuciones de dividendos y/o ganancias de capital.",
        CanonicalField::AdjustedClose,
    ),
    // 거래량
    ("volume", CanonicalField::Volume),
    ("volumen", CanonicalField::Volume),
];

/// 날짜 형식 후보 (순서대로 시도).
///
/// `01/02/2023`은 항상 월/일/연으로 해석합니다.
const DATE_FORMATS: &[&str] = &[
    DATE_FORMAT,
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// 숫자 셀에서 결측값을 뜻하는 표기.
const NULL_MARKERS: &[&str] = &["-", "--", "n/a", "na", "nan", "null", "none"];

/// 헤더 라벨 비교용 정규화.
///
/// "Adj Close**" → "adj close", "Máx." → "máx", "cierre_ajustado" → "cierre ajustado"
pub fn normalize_header(label: &str) -> String {
    let lowered = label.trim().to_lowercase();
    let trimmed =
        lowered.trim_end_matches(|c: char| c == '.' || c == '*' || c == ':' || c.is_whitespace());
    trimmed
        .replace(|c: char| c == '_' || c == '-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// 헤더 라벨에 해당하는 표준 필드를 찾습니다.
pub fn canonical_field(label: &str) -> Option<CanonicalField> {
    let key = normalize_header(label);
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| normalize_header(alias) == key)
        .map(|(_, field)| *field)
}

/// 날짜 문자열 파싱.
///
/// 지원 형식: `MM/DD/YYYY`, ISO(`YYYY-MM-DD`, 시각 포함 가능), 영어 월 이름
/// (`Jan 2, 2023`), 스페인어 월 이름 (`2 ene. 2023`, `2 de enero de 2023`).
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| parse_spanish_date(text))
}

fn spanish_month(token: &str) -> Option<u32> {
    let month = match token {
        "ene" | "enero" => 1,
        "feb" | "febrero" => 2,
        "mar" | "marzo" => 3,
        "abr" | "abril" => 4,
        "may" | "mayo" => 5,
        "jun" | "junio" => 6,
        "jul" | "julio" => 7,
        "ago" | "agosto" => 8,
        "sep" | "sept" | "set" | "septiembre" | "setiembre" => 9,
        "oct" | "octubre" => 10,
        "nov" | "noviembre" => 11,
        "dic" | "diciembre" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_spanish_date(text: &str) -> Option<NaiveDate> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| c.is_whitespace() || c == ',' || c == '.')
        .filter(|t| !t.is_empty() && *t != "de")
        .collect();

    if tokens.len() != 3 {
        return None;
    }

    // "2 ene 2023" 또는 "ene 2 2023"
    let (day, month) = if let Some(month) = spanish_month(tokens[1]) {
        (tokens[0], month)
    } else {
        (tokens[1], spanish_month(tokens[0])?)
    };

    NaiveDate::from_ymd_opt(tokens[2].parse().ok()?, month, day.parse().ok()?)
}

/// 숫자 셀의 서식 문자: 천 단위 구분자, 공백, 통화 기호, 퍼센트.
fn is_formatting(c: char) -> bool {
    c == ',' || c == '%' || c.is_whitespace() || matches!(c, '$' | '€' | '£' | '¥' | '₩')
}

/// 숫자 셀에서 서식 문자를 제거합니다.
///
/// 서식 문자 외에 숫자, `.`, `-`가 아닌 문자가 남으면 (`1.2E+3`, `(5.00)`,
/// `12abc34` 등) 파싱할 수 없는 셀로 봅니다.
fn clean_numeric(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() || NULL_MARKERS.contains(&text.to_lowercase().as_str()) {
        return None;
    }

    let cleaned: String = text.chars().filter(|c| !is_formatting(*c)).collect();
    if cleaned.is_empty()
        || cleaned == "-"
        || !cleaned.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-')
    {
        return None;
    }

    Some(cleaned)
}

/// 가격 셀 파싱 ("$1,234.56" → 1234.56). 음수는 유효하지 않은 값으로 봅니다.
pub fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned = clean_numeric(text)?;
    let value = Decimal::from_str(&cleaned).ok()?;

    if value < Decimal::ZERO {
        return None;
    }

    Some(value)
}

/// 거래량 셀 파싱 ("12,345,678" → 12345678). 소수부가 있으면 실패입니다.
pub fn parse_volume(text: &str) -> Option<u64> {
    let cleaned = clean_numeric(text)?;
    if let Ok(value) = cleaned.parse::<u64>() {
        return Some(value);
    }

    let value = Decimal::from_str(&cleaned).ok()?;
    if value < Decimal::ZERO || !value.fract().is_zero() {
        return None;
    }

    value.to_u64()
}

/// 셀 하나를 변환합니다. 비어 있지 않은 셀이 실패하면 debug 로그를 남깁니다.
fn coerce<T>(field: CanonicalField, raw: Option<&str>, parse: fn(&str) -> Option<T>) -> Option<T> {
    let raw = raw?;
    let value = parse(raw);
    if value.is_none() && !raw.trim().is_empty() {
        debug!(field = %field, raw = %raw, "Cell could not be parsed, storing null");
    }
    value
}

/// 원시 행 하나를 정규화합니다. 날짜를 파싱할 수 없으면 `None`입니다.
fn normalize_row(row: &RawRow) -> Option<CanonicalRecord> {
    let mut mapped: BTreeMap<CanonicalField, &str> = BTreeMap::new();
    let mut passthrough = Vec::new();

    for (label, value) in row.cells() {
        match canonical_field(label) {
            // 같은 필드로 매핑되는 헤더가 여러 개면 첫 번째만 사용
            Some(field) => {
                mapped.entry(field).or_insert(value);
            }
            None => passthrough.push((label.to_string(), value.to_string())),
        }
    }

    let date = parse_date(mapped.get(&CanonicalField::Date)?)?;
    let cell = |field: CanonicalField| mapped.get(&field).copied();

    Some(CanonicalRecord {
        date,
        open: coerce(CanonicalField::Open, cell(CanonicalField::Open), parse_price),
        high: coerce(CanonicalField::High, cell(CanonicalField::High), parse_price),
        low: coerce(CanonicalField::Low, cell(CanonicalField::Low), parse_price),
        close: coerce(CanonicalField::Close, cell(CanonicalField::Close), parse_price),
        adjusted_close: coerce(
            CanonicalField::AdjustedClose,
            cell(CanonicalField::AdjustedClose),
            parse_price,
        ),
        volume: coerce(CanonicalField::Volume, cell(CanonicalField::Volume), parse_volume),
        passthrough,
    })
}

/// 중복 판정 키 (표준 필드만 사용).
type DedupKey = (NaiveDate, [Option<Decimal>; 5], Option<u64>);

fn dedup_key(record: &CanonicalRecord) -> DedupKey {
    (
        record.date,
        [
            record.open.map(|v| v.normalize()),
            record.high.map(|v| v.normalize()),
            record.low.map(|v| v.normalize()),
            record.close.map(|v| v.normalize()),
            record.adjusted_close.map(|v| v.normalize()),
        ],
        record.volume,
    )
}

/// 원시 행을 정규화된 레코드 시퀀스로 변환합니다.
///
/// 입력이 비어 있거나 모든 행의 날짜를 파싱할 수 없으면 빈 벡터를 반환합니다.
/// 이는 오류가 아니라 "데이터 없음"이라는 정상 결과입니다.
pub fn normalize(raw_rows: &[RawRow]) -> Vec<CanonicalRecord> {
    if raw_rows.is_empty() {
        warn!("No raw rows to normalize");
        return Vec::new();
    }

    let mut records: Vec<CanonicalRecord> = raw_rows.iter().filter_map(normalize_row).collect();
    let undated = raw_rows.len() - records.len();

    // 첫 번째 발생만 유지
    let parsed = records.len();
    let mut seen = HashSet::with_capacity(parsed);
    records.retain(|record| seen.insert(dedup_key(record)));
    let duplicates = parsed - records.len();

    // 안정 정렬: 같은 날짜의 부분 레코드는 소스 순서를 유지
    records.sort_by_key(|record| record.date);

    if records.is_empty() {
        warn!(
            input = raw_rows.len(),
            undated, "No raw row had a parseable date"
        );
    } else {
        info!(
            input = raw_rows.len(),
            output = records.len(),
            undated,
            duplicates,
            "Normalized raw rows"
        );
    }

    records
}

/// 정규화된 레코드를 표준 라벨의 원시 행 형태로 되돌립니다.
///
/// 날짜는 `MM/DD/YYYY`, 결측값은 빈 문자열이며 passthrough 컬럼은 뒤에 붙습니다.
/// `normalize(&to_raw_rows(&records))`는 `records`와 같은 시퀀스를 돌려줍니다.
pub fn to_raw_rows(records: &[CanonicalRecord]) -> Vec<RawRow> {
    records
        .iter()
        .map(|record| {
            let mut row = RawRow::new();
            for field in CanonicalField::ALL {
                let value = match field {
                    CanonicalField::Date => record.date.format(DATE_FORMAT).to_string(),
                    CanonicalField::Volume => {
                        record.volume.map(|v| v.to_string()).unwrap_or_default()
                    }
                    _ => record
                        .decimal(field)
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                };
                row.push(field.as_str(), value);
            }
            for (label, value) in &record.passthrough {
                row.push(label.clone(), value.clone());
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_header_aliases() {
        assert_eq!(canonical_field("Fecha"), Some(CanonicalField::Date));
        assert_eq!(canonical_field("Abrir"), Some(CanonicalField::Open));
        assert_eq!(canonical_field("apertura"), Some(CanonicalField::Open));
        assert_eq!(canonical_field("Máx."), Some(CanonicalField::High));
        assert_eq!(canonical_field("Mín."), Some(CanonicalField::Low));
        assert_eq!(canonical_field("Close*"), Some(CanonicalField::Close));
        assert_eq!(canonical_field("cerrar"), Some(CanonicalField::Close));
        assert_eq!(canonical_field("Adj Close**"), Some(CanonicalField::AdjustedClose));
        assert_eq!(
            canonical_field("cierre_ajustado"),
            Some(CanonicalField::AdjustedClose)
        );
        assert_eq!(
            canonical_field(
                "Precio de cierre ajustado por divisiones y distribuciones de dividendos y/o ganancias de capital."
            ),
            Some(CanonicalField::AdjustedClose)
        );
        assert_eq!(canonical_field("VOLUMEN"), Some(CanonicalField::Volume));
        assert_eq!(canonical_field("Dividend"), None);
    }

    #[test]
    fn test_every_canonical_name_is_an_alias() {
        for field in CanonicalField::ALL {
            assert_eq!(canonical_field(field.as_str()), Some(field));
        }
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("01/02/2023"), Some(date(2023, 1, 2)));
        assert_eq!(parse_date("2023-01-02"), Some(date(2023, 1, 2)));
        assert_eq!(parse_date("2023-01-02 00:00:00"), Some(date(2023, 1, 2)));
        assert_eq!(parse_date("Jan 2, 2023"), Some(date(2023, 1, 2)));
        assert_eq!(parse_date("2 ene. 2023"), Some(date(2023, 1, 2)));
        assert_eq!(parse_date("15 de marzo de 2024"), Some(date(2024, 3, 15)));
        assert_eq!(parse_date("dic 31, 2022"), Some(date(2022, 12, 31)));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("Dividend"), None);
        assert_eq!(parse_date("13/45/2023"), None);
    }

    #[test]
    fn test_parse_price_strips_formatting() {
        assert_eq!(parse_price("1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_price("$ 99.10"), Some(dec!(99.10)));
        assert_eq!(parse_price(" 100 "), Some(dec!(100)));
        assert_eq!(parse_price("-"), None);
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price("1.234.56"), None);
        assert_eq!(parse_price("-5.00"), None);
        assert_eq!(parse_price("€ 12.50"), Some(dec!(12.50)));
        assert_eq!(parse_price("1\u{a0}234.5"), Some(dec!(1234.5)));
    }

    #[test]
    fn test_parse_price_rejects_non_formatting_characters() {
        assert_eq!(parse_price("1.2E+3"), None);
        assert_eq!(parse_price("12abc34"), None);
        assert_eq!(parse_price("(5.00)"), None);
        assert_eq!(parse_price("5.00*"), None);
        assert_eq!(parse_volume("1.5M"), None);
        assert_eq!(parse_volume("12,345 shares"), None);
    }

    #[test]
    fn test_parse_volume() {
        assert_eq!(parse_volume("12,345,678"), Some(12_345_678));
        assert_eq!(parse_volume("1500.00"), Some(1500));
        assert_eq!(parse_volume("1500.5"), None);
        assert_eq!(parse_volume("N/A"), None);
    }

    #[test]
    fn test_two_day_scenario() {
        let rows = vec![
            RawRow::new().with("date", "01/02/2023").with("close", "100"),
            RawRow::new().with("date", "01/03/2023").with("close", "110"),
        ];

        let records = normalize(&rows);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].close, Some(dec!(100)));
        assert_eq!(records[1].close, Some(dec!(110)));
        assert!(records[0].open.is_none());
    }

    #[test]
    fn test_malformed_volume_becomes_null() {
        let rows = vec![RawRow::new()
            .with("Fecha", "01/02/2023")
            .with("Abrir", "98.50")
            .with("Máx.", "101.00")
            .with("Mín.", "97.25")
            .with("Cerrar", "100.00")
            .with("cierre_ajustado", "99.75")
            .with("Volumen", "N/A")];

        let records = normalize(&rows);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.volume, None);
        assert_eq!(record.open, Some(dec!(98.50)));
        assert_eq!(record.high, Some(dec!(101.00)));
        assert_eq!(record.low, Some(dec!(97.25)));
        assert_eq!(record.close, Some(dec!(100.00)));
        assert_eq!(record.adjusted_close, Some(dec!(99.75)));
    }

    #[test]
    fn test_unparseable_dates_are_dropped() {
        let rows = vec![
            RawRow::new().with("date", "not a date").with("close", "1"),
            RawRow::new().with("close", "2"),
            RawRow::new().with("date", "01/05/2023").with("close", "3"),
        ];

        let records = normalize(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, date(2023, 1, 5));
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert!(normalize(&[]).is_empty());
        let rows = vec![RawRow::new().with("foo", "bar")];
        assert!(normalize(&rows).is_empty());
    }

    #[test]
    fn test_duplicates_removed_but_not_same_date_partials() {
        let rows = vec![
            RawRow::new().with("date", "01/03/2023").with("close", "110"),
            RawRow::new().with("date", "01/02/2023").with("close", "100"),
            RawRow::new().with("date", "01/02/2023").with("close", "100.00"),
            // 배당 행: 같은 날짜지만 다른 부분 레코드
            RawRow::new().with("date", "01/02/2023").with("Dividend", "0.50"),
        ];

        let records = normalize(&rows);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].date, date(2023, 1, 2));
        assert_eq!(records[0].close, Some(dec!(100)));
        assert_eq!(records[1].date, date(2023, 1, 2));
        assert_eq!(records[1].close, None);
        assert_eq!(
            records[1].passthrough,
            vec![("Dividend".to_string(), "0.50".to_string())]
        );
        assert_eq!(records[2].date, date(2023, 1, 3));
    }

    #[test]
    fn test_first_duplicate_header_wins() {
        let rows = vec![RawRow::new()
            .with("date", "01/02/2023")
            .with("Cerrar", "100")
            .with("close", "999")];

        let records = normalize(&rows);
        assert_eq!(records[0].close, Some(dec!(100)));
        assert!(records[0].passthrough.is_empty());
    }

    #[test]
    fn test_round_trip_through_raw_rows() {
        let rows = vec![
            RawRow::new()
                .with("Fecha", "2 ene. 2023")
                .with("Cerrar", "1,100.50")
                .with("Volumen", "1,000")
                .with("Nota", "x"),
            RawRow::new()
                .with("Fecha", "3 ene. 2023")
                .with("Cerrar", "-")
                .with("Volumen", "N/A")
                .with("Nota", "y"),
        ];

        let first = normalize(&rows);
        let second = normalize(&to_raw_rows(&first));
        assert_eq!(first, second);
    }
}
