#![forbid(unsafe_code)]

use tf_core::{BranchId, GameId, RecordId, TimelineRecord};
use tf_storage::{AppendRecordRequest, StoreError};

use crate::error::ServiceError;
use crate::store::TimelineStore;
use crate::support::{ts_ms_to_rfc3339, ts_s_to_rfc3339};

/// Branch-level operations over an injected timeline store.
///
/// Everything here appends; nothing rewrites history. The one identity
/// rule worth keeping in mind: `advance` reuses the branch id of the
/// head it extends, `fork` always mints a fresh one. Reads resolve a
/// branch to the record with the greatest `created_at_ms`, ties going
/// to the greatest id.
pub struct TimelineService<S> {
    store: S,
}

impl<S: TimelineStore> TimelineService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Hands the store back, for callers that pass one handle between
    /// services.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Opens a brand-new branch for the game, standing at `start_date_s`.
    pub fn start_new_branch(
        &mut self,
        game_id: GameId,
        start_date_s: i64,
    ) -> Result<TimelineRecord, ServiceError> {
        let record = self.store.append_record(AppendRecordRequest {
            id: RecordId::new(),
            branch_id: BranchId::new(),
            game_id,
            parent_id: None,
            start_date_s,
            current_date_s: start_date_s,
        })?;

        tracing::info!(
            branch = %record.branch_id(),
            game = %game_id,
            "timeline branch started"
        );
        Ok(record)
    }

    /// Branches off the head of `source_branch_id` under a fresh branch
    /// id, with the head as parent.
    ///
    /// The fork restarts its clock: the new record stands at the shared
    /// `start_date_s`, not at the source's current progress.
    pub fn fork(&mut self, source_branch_id: BranchId) -> Result<TimelineRecord, ServiceError> {
        let head = self.resolve_head(source_branch_id)?;

        let record = self.store.append_record(AppendRecordRequest {
            id: RecordId::new(),
            branch_id: BranchId::new(),
            game_id: head.game_id(),
            parent_id: Some(head.id()),
            start_date_s: head.start_date_s(),
            current_date_s: head.start_date_s(),
        })?;

        tracing::info!(
            source = %source_branch_id,
            branch = %record.branch_id(),
            created = %ts_ms_to_rfc3339(record.created_at_ms()),
            "timeline forked"
        );
        Ok(record)
    }

    /// Records `elapsed_s` seconds of play on the branch.
    ///
    /// Elapsed time counts from the branch's `start_date_s`, not from
    /// the previous head, so repeating a call with the same value lands
    /// an equal state instead of doubling it.
    pub fn advance(
        &mut self,
        branch_id: BranchId,
        elapsed_s: u64,
    ) -> Result<TimelineRecord, ServiceError> {
        let head = self.resolve_head(branch_id)?;
        let record = self.store.append_record(advance_request(&head, elapsed_s)?)?;

        tracing::debug!(
            branch = %branch_id,
            current = %ts_s_to_rfc3339(record.current_date_s()),
            "timeline advanced"
        );
        Ok(record)
    }

    /// `advance`, refused unless the head is still `expected_head` at
    /// append time.
    ///
    /// Plain `advance` resolves the head and appends in two steps, so
    /// two racing callers can both land and the later append wins. This
    /// variant turns that race into `HeadMoved`.
    pub fn advance_if_head(
        &mut self,
        branch_id: BranchId,
        elapsed_s: u64,
        expected_head: RecordId,
    ) -> Result<TimelineRecord, ServiceError> {
        let head = self.resolve_head(branch_id)?;
        let request = advance_request(&head, elapsed_s)?;

        let record = match self.store.append_record_if_head(request, expected_head) {
            Ok(record) => record,
            Err(StoreError::HeadMismatch { expected, actual }) => {
                return Err(ServiceError::HeadMoved { expected, actual });
            }
            Err(err) => return Err(ServiceError::Storage(err)),
        };

        tracing::debug!(
            branch = %branch_id,
            current = %ts_s_to_rfc3339(record.current_date_s()),
            "timeline advanced"
        );
        Ok(record)
    }

    /// Current head of the branch.
    pub fn head_of(&self, branch_id: BranchId) -> Result<TimelineRecord, ServiceError> {
        self.resolve_head(branch_id)
    }

    /// Walks the branch history: rank 0 is the head, rank 1 the state
    /// before it, and so on. Out-of-range ranks are `NotFound`.
    pub fn head_of_rank(
        &self,
        branch_id: BranchId,
        rank: usize,
    ) -> Result<TimelineRecord, ServiceError> {
        self.store
            .head_of_rank(branch_id, rank)?
            .ok_or(ServiceError::NotFound("timeline"))
    }

    /// One true head per branch of the game, newest first. An empty game
    /// yields an empty list, not an error.
    pub fn all_branches_of(&self, game_id: GameId) -> Result<Vec<TimelineRecord>, ServiceError> {
        Ok(self.store.current_branches_of(game_id)?)
    }

    fn resolve_head(&self, branch_id: BranchId) -> Result<TimelineRecord, ServiceError> {
        self.store
            .head_of(branch_id)?
            .ok_or(ServiceError::NotFound("timeline"))
    }
}

fn advance_request(
    head: &TimelineRecord,
    elapsed_s: u64,
) -> Result<AppendRecordRequest, ServiceError> {
    let current_date_s = i64::try_from(elapsed_s)
        .ok()
        .and_then(|elapsed| head.start_date_s().checked_add(elapsed))
        .ok_or(ServiceError::Validation("elapsed play time is out of range"))?;

    Ok(AppendRecordRequest {
        id: RecordId::new(),
        branch_id: head.branch_id(),
        game_id: head.game_id(),
        parent_id: Some(head.id()),
        start_date_s: head.start_date_s(),
        current_date_s,
    })
}
