#![forbid(unsafe_code)]

use tf_core::{BranchId, GameId, RecordId};

/// Payload for one append. `created_at_ms` is deliberately absent: the
/// store assigns it at insert time so the append order is the only clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppendRecordRequest {
    pub id: RecordId,
    pub branch_id: BranchId,
    pub game_id: GameId,
    pub parent_id: Option<RecordId>,
    pub start_date_s: i64,
    pub current_date_s: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateGameRequest {
    pub id: GameId,
    pub name: String,
}
