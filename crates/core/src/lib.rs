#![forbid(unsafe_code)]

pub mod ids;
pub mod model;

pub use ids::{BranchId, GameId, IdParseError, RecordId};
pub use model::{Game, SettingDecodeError, SettingValue, TimelineRecord, TimelineRecordError};
