//! 데이터셋 저장소.
//!
//! 정규화 데이터셋과 지표 데이터셋을 CSV 파일로 저장하고 다시 읽습니다.

pub mod csv;

pub use self::csv::{
    parse_table, read_table, stage_enriched, stage_history, StagedFile, ENRICHED_HEADER,
    HISTORY_HEADER,
};
