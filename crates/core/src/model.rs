#![forbid(unsafe_code)]

use crate::ids::{BranchId, GameId, RecordId};
use serde::{Deserialize, Serialize};

/// One immutable version of a branch.
///
/// Records are only ever appended. Advancing play, rewinding, and forking
/// all mint new records; nothing in the workspace mutates or deletes an
/// existing one. `start_date_s` and `current_date_s` are in-fiction epoch
/// seconds; `created_at_ms` is the wall-clock append instant the store
/// assigned and is what orders records within a branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRecord {
    id: RecordId,
    branch_id: BranchId,
    game_id: GameId,
    parent_id: Option<RecordId>,
    start_date_s: i64,
    current_date_s: i64,
    created_at_ms: i64,
}

impl TimelineRecord {
    pub fn try_new(
        id: RecordId,
        branch_id: BranchId,
        game_id: GameId,
        parent_id: Option<RecordId>,
        start_date_s: i64,
        current_date_s: i64,
        created_at_ms: i64,
    ) -> Result<Self, TimelineRecordError> {
        if current_date_s < start_date_s {
            return Err(TimelineRecordError::CurrentBeforeStart);
        }
        if parent_id.is_some_and(|parent| parent == id) {
            return Err(TimelineRecordError::ParentIsSelf);
        }
        Ok(Self {
            id,
            branch_id,
            game_id,
            parent_id,
            start_date_s,
            current_date_s,
            created_at_ms,
        })
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn parent_id(&self) -> Option<RecordId> {
        self.parent_id
    }

    pub fn start_date_s(&self) -> i64 {
        self.start_date_s
    }

    pub fn current_date_s(&self) -> i64 {
        self.current_date_s
    }

    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }

    /// In-fiction seconds of play captured by this record.
    pub fn elapsed_s(&self) -> i64 {
        self.current_date_s - self.start_date_s
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimelineRecordError {
    CurrentBeforeStart,
    ParentIsSelf,
}

impl TimelineRecordError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::CurrentBeforeStart => "current date must not precede the start date",
            Self::ParentIsSelf => "record must not be its own parent",
        }
    }
}

/// A save slot: the owner of branches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub created_at_ms: i64,
}

/// Typed value of one settings entry.
///
/// The kind tag and textual encoding are stable storage contracts:
/// `string`, `int`, `float`, `boolean`, encoded via `Display` of the inner
/// value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SettingValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl SettingValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "string",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "boolean",
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
        }
    }

    pub fn decode(kind: &str, raw: &str) -> Result<Self, SettingDecodeError> {
        match kind {
            "string" => Ok(Self::Text(raw.to_string())),
            "int" => raw
                .parse::<i64>()
                .map(Self::Int)
                .map_err(|_| SettingDecodeError::Malformed),
            "float" => raw
                .parse::<f64>()
                .map(Self::Float)
                .map_err(|_| SettingDecodeError::Malformed),
            "boolean" => raw
                .parse::<bool>()
                .map(Self::Bool)
                .map_err(|_| SettingDecodeError::Malformed),
            _ => Err(SettingDecodeError::UnknownKind),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingDecodeError {
    UnknownKind,
    Malformed,
}

impl SettingDecodeError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::UnknownKind => "setting kind is not supported",
            Self::Malformed => "setting value does not match its kind",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: i64, current: i64) -> Result<TimelineRecord, TimelineRecordError> {
        TimelineRecord::try_new(
            RecordId::new(),
            BranchId::new(),
            GameId::new(),
            None,
            start,
            current,
            1_700_000_000_000,
        )
    }

    #[test]
    fn accepts_current_at_or_after_start() {
        let at_start = record(100, 100).expect("current == start is valid");
        assert_eq!(at_start.elapsed_s(), 0);

        let later = record(100, 4_100).expect("current > start is valid");
        assert_eq!(later.elapsed_s(), 4_000);
    }

    #[test]
    fn rejects_current_before_start() {
        let err = record(100, 99).expect_err("current < start must be rejected");
        assert_eq!(err, TimelineRecordError::CurrentBeforeStart);
    }

    #[test]
    fn rejects_self_parent() {
        let id = RecordId::new();
        let err = TimelineRecord::try_new(
            id,
            BranchId::new(),
            GameId::new(),
            Some(id),
            0,
            0,
            0,
        )
        .expect_err("a record must not parent itself");
        assert_eq!(err, TimelineRecordError::ParentIsSelf);
    }

    #[test]
    fn setting_values_encode_with_stable_kinds() {
        let cases = [
            (SettingValue::Text("hello".into()), "string", "hello"),
            (SettingValue::Int(-42), "int", "-42"),
            (SettingValue::Float(1.5), "float", "1.5"),
            (SettingValue::Bool(true), "boolean", "true"),
        ];
        for (value, kind, encoded) in cases {
            assert_eq!(value.kind(), kind);
            assert_eq!(value.encode(), encoded);
            let decoded = SettingValue::decode(kind, &value.encode())
                .expect("encoded value must decode under its own kind");
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn setting_decode_rejects_mismatches() {
        let err = SettingValue::decode("int", "not-a-number")
            .expect_err("non-numeric int payload must fail");
        assert_eq!(err, SettingDecodeError::Malformed);

        let err = SettingValue::decode("duration", "5s").expect_err("unknown kind must fail");
        assert_eq!(err, SettingDecodeError::UnknownKind);
    }
}
