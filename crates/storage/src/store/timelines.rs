#![forbid(unsafe_code)]

use super::*;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use tf_core::{BranchId, GameId, RecordId, TimelineRecord};

impl SqliteStore {
    /// Appends one record. The store assigns `created_at_ms`, clamped so
    /// it never decreases across appends even if the wall clock does.
    pub fn append_record(
        &mut self,
        request: AppendRecordRequest,
    ) -> Result<TimelineRecord, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;
        let record = append_record_tx(&tx, request, now_ms)?;
        tx.commit()?;
        Ok(record)
    }

    /// Compare-and-append: refuses to append unless the branch head at
    /// insert time is exactly `expected_head`. This is the opt-in guard
    /// against the read-then-append race; plain `append_record` keeps
    /// last-writer-wins semantics.
    pub fn append_record_if_head(
        &mut self,
        request: AppendRecordRequest,
        expected_head: RecordId,
    ) -> Result<TimelineRecord, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let actual = head_record(&tx, request.branch_id)?.map(|record| record.id());
        if actual != Some(expected_head) {
            return Err(StoreError::HeadMismatch {
                expected: expected_head,
                actual,
            });
        }

        let record = append_record_tx(&tx, request, now_ms)?;
        tx.commit()?;
        Ok(record)
    }

    /// Newest record of the branch: greatest `created_at_ms`, ties broken
    /// by greatest id. `Ok(None)` when no record carries the branch id.
    pub fn head_of(&self, branch_id: BranchId) -> Result<Option<TimelineRecord>, StoreError> {
        head_record(&self.conn, branch_id)
    }

    /// Rank 0 is the head, rank 1 the state before it, and so on.
    /// Out-of-range ranks are `Ok(None)`.
    pub fn head_of_rank(
        &self,
        branch_id: BranchId,
        rank: usize,
    ) -> Result<Option<TimelineRecord>, StoreError> {
        let offset = to_sqlite_i64(rank)?;
        let row = self
            .conn
            .query_row(
                "SELECT id, branch_id, game_id, parent_id, start_date_s, current_date_s, created_at_ms \
                 FROM timeline_records \
                 WHERE branch_id=?1 \
                 ORDER BY created_at_ms DESC, id DESC \
                 LIMIT 1 OFFSET ?2",
                params![branch_id.to_string(), offset],
                scan_record,
            )
            .optional()?;
        row.map(record_from_row).transpose()
    }

    /// True head of every distinct branch of the game, newest first.
    ///
    /// Selection is per-partition: each branch contributes the record the
    /// `head_of` ordering would pick, regardless of how branches interleave
    /// in append order. Grouping an ordered scan does not guarantee that
    /// and is not used here.
    pub fn current_branches_of(
        &self,
        game_id: GameId,
    ) -> Result<Vec<TimelineRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, branch_id, game_id, parent_id, start_date_s, current_date_s, created_at_ms
            FROM (
              SELECT id, branch_id, game_id, parent_id, start_date_s, current_date_s, created_at_ms,
                     ROW_NUMBER() OVER (
                       PARTITION BY branch_id
                       ORDER BY created_at_ms DESC, id DESC
                     ) AS head_rank
              FROM timeline_records
              WHERE game_id = ?1
            )
            WHERE head_rank = 1
            ORDER BY created_at_ms DESC, id DESC
            "#,
        )?;

        let mut rows = stmt.query(params![game_id.to_string()])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(record_from_row(scan_record(row)?)?);
        }
        Ok(out)
    }
}

fn append_record_tx(
    tx: &Transaction<'_>,
    request: AppendRecordRequest,
    now_ms: i64,
) -> Result<TimelineRecord, StoreError> {
    ensure_game_exists_tx(tx, request.game_id)?;
    if let Some(parent_id) = request.parent_id {
        ensure_record_exists_tx(tx, parent_id)?;
    }

    let created_at_ms = next_created_at_ms_tx(tx, now_ms)?;
    let record = TimelineRecord::try_new(
        request.id,
        request.branch_id,
        request.game_id,
        request.parent_id,
        request.start_date_s,
        request.current_date_s,
        created_at_ms,
    )
    .map_err(|err| StoreError::InvalidInput(err.message()))?;

    let insert = tx.execute(
        "INSERT INTO timeline_records(id, branch_id, game_id, parent_id, start_date_s, current_date_s, created_at_ms) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id().to_string(),
            record.branch_id().to_string(),
            record.game_id().to_string(),
            record.parent_id().map(|id| id.to_string()),
            record.start_date_s(),
            record.current_date_s(),
            record.created_at_ms(),
        ],
    );

    if let Err(err) = insert {
        return Err(map_insert_conflict(err, StoreError::RecordAlreadyExists));
    }

    tracing::debug!(
        record = %record.id(),
        branch = %record.branch_id(),
        "timeline record appended"
    );
    Ok(record)
}

fn head_record(
    conn: &Connection,
    branch_id: BranchId,
) -> Result<Option<TimelineRecord>, StoreError> {
    let row = conn
        .query_row(
            "SELECT id, branch_id, game_id, parent_id, start_date_s, current_date_s, created_at_ms \
             FROM timeline_records \
             WHERE branch_id=?1 \
             ORDER BY created_at_ms DESC, id DESC \
             LIMIT 1",
            params![branch_id.to_string()],
            scan_record,
        )
        .optional()?;
    row.map(record_from_row).transpose()
}

fn ensure_game_exists_tx(tx: &Transaction<'_>, game_id: GameId) -> Result<(), StoreError> {
    let exists = tx
        .query_row(
            "SELECT 1 FROM games WHERE id=?1",
            params![game_id.to_string()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some();

    if exists {
        Ok(())
    } else {
        Err(StoreError::UnknownGame)
    }
}

fn ensure_record_exists_tx(tx: &Transaction<'_>, record_id: RecordId) -> Result<(), StoreError> {
    let exists = tx
        .query_row(
            "SELECT 1 FROM timeline_records WHERE id=?1",
            params![record_id.to_string()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some();

    if exists {
        Ok(())
    } else {
        Err(StoreError::UnknownRecord)
    }
}

// Strictly increasing across appends, even when the wall clock stalls or
// steps backwards. Equal stamps can only enter through external writes;
// reads still resolve those via the id tie-break.
fn next_created_at_ms_tx(tx: &Transaction<'_>, now_ms: i64) -> Result<i64, StoreError> {
    let max_existing = tx.query_row(
        "SELECT COALESCE(MAX(created_at_ms), 0) FROM timeline_records",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(now_ms.max(max_existing.saturating_add(1)))
}

type RecordRow = (String, String, String, Option<String>, i64, i64, i64);

fn scan_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RecordRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn record_from_row(row: RecordRow) -> Result<TimelineRecord, StoreError> {
    let (id, branch_id, game_id, parent_id, start_date_s, current_date_s, created_at_ms) = row;

    let id = RecordId::parse(&id).map_err(|_| StoreError::InvalidInput("invalid record row"))?;
    let branch_id =
        BranchId::parse(&branch_id).map_err(|_| StoreError::InvalidInput("invalid record row"))?;
    let game_id =
        GameId::parse(&game_id).map_err(|_| StoreError::InvalidInput("invalid record row"))?;
    let parent_id = parent_id
        .as_deref()
        .map(RecordId::parse)
        .transpose()
        .map_err(|_| StoreError::InvalidInput("invalid record row"))?;

    TimelineRecord::try_new(
        id,
        branch_id,
        game_id,
        parent_id,
        start_date_s,
        current_date_s,
        created_at_ms,
    )
    .map_err(|_| StoreError::InvalidInput("invalid record row"))
}
