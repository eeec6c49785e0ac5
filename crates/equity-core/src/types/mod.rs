//! 파이프라인 전반에서 사용되는 공통 타입.

mod field;
mod month;
mod record;

pub use field::*;
pub use month::*;
pub use record::*;
