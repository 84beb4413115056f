#![forbid(unsafe_code)]

use tf_core::{BranchId, Game, GameId, RecordId, SettingValue, TimelineRecord};
use tf_storage::{AppendRecordRequest, CreateGameRequest, SqliteStore, StoreError};

/// Storage seam for branch history.
///
/// Services hold whatever implements these traits instead of a concrete
/// handle, so tests can inject doubles and callers decide which store
/// backs which service. `SqliteStore` implements all three.
pub trait TimelineStore {
    fn append_record(
        &mut self,
        request: AppendRecordRequest,
    ) -> Result<TimelineRecord, StoreError>;

    fn append_record_if_head(
        &mut self,
        request: AppendRecordRequest,
        expected_head: RecordId,
    ) -> Result<TimelineRecord, StoreError>;

    fn head_of(&self, branch_id: BranchId) -> Result<Option<TimelineRecord>, StoreError>;

    fn head_of_rank(
        &self,
        branch_id: BranchId,
        rank: usize,
    ) -> Result<Option<TimelineRecord>, StoreError>;

    fn current_branches_of(&self, game_id: GameId) -> Result<Vec<TimelineRecord>, StoreError>;
}

/// Storage seam for the save-slot registry.
pub trait GameStore {
    fn create_game(&mut self, request: CreateGameRequest) -> Result<Game, StoreError>;

    fn get_game(&self, id: GameId) -> Result<Option<Game>, StoreError>;
}

/// Storage seam for typed settings.
pub trait SettingsStore {
    fn setting_create(&mut self, key: &str, value: SettingValue) -> Result<(), StoreError>;

    fn setting_get(&self, key: &str) -> Result<Option<SettingValue>, StoreError>;

    fn setting_update(&mut self, key: &str, value: SettingValue) -> Result<(), StoreError>;

    fn settings_all(&self) -> Result<Vec<(String, SettingValue)>, StoreError>;
}

impl TimelineStore for SqliteStore {
    fn append_record(
        &mut self,
        request: AppendRecordRequest,
    ) -> Result<TimelineRecord, StoreError> {
        SqliteStore::append_record(self, request)
    }

    fn append_record_if_head(
        &mut self,
        request: AppendRecordRequest,
        expected_head: RecordId,
    ) -> Result<TimelineRecord, StoreError> {
        SqliteStore::append_record_if_head(self, request, expected_head)
    }

    fn head_of(&self, branch_id: BranchId) -> Result<Option<TimelineRecord>, StoreError> {
        SqliteStore::head_of(self, branch_id)
    }

    fn head_of_rank(
        &self,
        branch_id: BranchId,
        rank: usize,
    ) -> Result<Option<TimelineRecord>, StoreError> {
        SqliteStore::head_of_rank(self, branch_id, rank)
    }

    fn current_branches_of(&self, game_id: GameId) -> Result<Vec<TimelineRecord>, StoreError> {
        SqliteStore::current_branches_of(self, game_id)
    }
}

impl GameStore for SqliteStore {
    fn create_game(&mut self, request: CreateGameRequest) -> Result<Game, StoreError> {
        SqliteStore::create_game(self, request)
    }

    fn get_game(&self, id: GameId) -> Result<Option<Game>, StoreError> {
        SqliteStore::get_game(self, id)
    }
}

impl SettingsStore for SqliteStore {
    fn setting_create(&mut self, key: &str, value: SettingValue) -> Result<(), StoreError> {
        SqliteStore::setting_create(self, key, value)
    }

    fn setting_get(&self, key: &str) -> Result<Option<SettingValue>, StoreError> {
        SqliteStore::setting_get(self, key)
    }

    fn setting_update(&mut self, key: &str, value: SettingValue) -> Result<(), StoreError> {
        SqliteStore::setting_update(self, key, value)
    }

    fn settings_all(&self) -> Result<Vec<(String, SettingValue)>, StoreError> {
        SqliteStore::settings_all(self)
    }
}
