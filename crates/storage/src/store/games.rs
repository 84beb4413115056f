#![forbid(unsafe_code)]

use super::*;
use rusqlite::{OptionalExtension, params};
use tf_core::{Game, GameId};

impl SqliteStore {
    pub fn create_game(&mut self, request: CreateGameRequest) -> Result<Game, StoreError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("game name must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let insert = tx.execute(
            "INSERT INTO games(id, name, created_at_ms) VALUES (?1, ?2, ?3)",
            params![request.id.to_string(), name, now_ms],
        );
        if let Err(err) = insert {
            return Err(map_insert_conflict(err, StoreError::GameAlreadyExists));
        }

        tx.commit()?;
        Ok(Game {
            id: request.id,
            name: name.to_string(),
            created_at_ms: now_ms,
        })
    }

    pub fn get_game(&self, game_id: GameId) -> Result<Option<Game>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT name, created_at_ms FROM games WHERE id=?1",
                params![game_id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        Ok(row.map(|(name, created_at_ms)| Game {
            id: game_id,
            name,
            created_at_ms,
        }))
    }
}
