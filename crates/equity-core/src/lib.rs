//! # Equity Core
//!
//! 단일 종목 주가 파이프라인의 핵심 타입을 제공합니다.
//!
//! 이 크레이트는 파이프라인 전반에서 사용되는 기본 구성 요소를 담고 있습니다:
//! - 원시 행(raw row), 정규화 레코드, 지표 레코드 타입
//! - 표준 컬럼(필드) 정의
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
