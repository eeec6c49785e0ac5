//! 과거 시세 HTML 테이블 수집기.
//!
//! 설정된 URL을 브라우저 User-Agent로 요청하고, 응답 HTML에서 시세 테이블을
//! 찾아 헤더 라벨 → 셀 텍스트 형태의 원시 행으로 변환합니다.
//!
//! ## 테이블 탐색
//! 1. `div[data-testid="history-table"] table`
//! 2. 없으면 문서의 첫 번째 `table`
//!
//! 헤더는 `thead th`에서 읽고, 셀 수가 헤더 수와 같은 본문 행만 유지합니다.
//! (배당/분할 안내 행은 `colspan`으로 셀 수가 달라 자연스럽게 제외됩니다.)

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use equity_core::{RawRow, SourceConfig};

use super::RawRecordSource;
use crate::error::{DataError, Result};

const HISTORY_TABLE_SELECTOR: &str = r#"div[data-testid="history-table"] table"#;

/// 과거 시세 페이지 수집기.
pub struct HistoryTableSource {
    client: Client,
    url: String,
}

impl HistoryTableSource {
    /// 소스 설정으로 수집기를 생성합니다.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// 요청 URL
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_html(&self) -> Result<String> {
        debug!(url = %self.url, "Requesting history page");
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataError::SourceUnavailable(format!(
                "unexpected status {} from {}",
                status, self.url
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl RawRecordSource for HistoryTableSource {
    fn name(&self) -> &str {
        "history_table"
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        let html = self.fetch_html().await?;
        let rows = parse_history_table(&html)?;
        info!(url = %self.url, rows = rows.len(), "Parsed history table");
        Ok(rows)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DataError::ParseError(format!("selector {}: {:?}", css, e)))
}

fn cell_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// HTML 문서에서 시세 테이블을 찾아 원시 행으로 변환합니다.
///
/// 테이블이나 헤더가 없으면 `SourceUnavailable`을 반환합니다.
pub fn parse_history_table(html: &str) -> Result<Vec<RawRow>> {
    let document = Html::parse_document(html);

    let history_selector = selector(HISTORY_TABLE_SELECTOR)?;
    let table_selector = selector("table")?;
    let header_selector = selector("thead th")?;
    let row_selector = selector("tbody tr")?;
    let cell_selector = selector("td")?;

    let table = document
        .select(&history_selector)
        .next()
        .or_else(|| document.select(&table_selector).next())
        .ok_or_else(|| DataError::SourceUnavailable("history table not found".to_string()))?;

    let headers: Vec<String> = table.select(&header_selector).map(cell_text).collect();
    if headers.is_empty() {
        return Err(DataError::SourceUnavailable(
            "history table has no header row".to_string(),
        ));
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for tr in table.select(&row_selector) {
        let cells: Vec<String> = tr.select(&cell_selector).map(cell_text).collect();
        if cells.len() != headers.len() {
            skipped += 1;
            continue;
        }
        rows.push(headers.iter().cloned().zip(cells).collect::<RawRow>());
    }

    debug!(
        columns = headers.len(),
        rows = rows.len(),
        skipped,
        "Extracted history table rows"
    );

    Ok(rows)
}
