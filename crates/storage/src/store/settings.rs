#![forbid(unsafe_code)]

use super::*;
use rusqlite::{OptionalExtension, params};
use tf_core::SettingValue;

impl SqliteStore {
    pub fn setting_create(&mut self, key: &str, value: SettingValue) -> Result<(), StoreError> {
        let key = canonical_key(key)?;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let insert = tx.execute(
            "INSERT INTO settings(key, value, kind, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![key, value.encode(), value.kind(), now_ms],
        );
        if let Err(err) = insert {
            return Err(map_insert_conflict(err, StoreError::SettingAlreadyExists));
        }

        tx.commit()?;
        Ok(())
    }

    pub fn setting_get(&self, key: &str) -> Result<Option<SettingValue>, StoreError> {
        let key = canonical_key(key)?;

        let row = self
            .conn
            .query_row(
                "SELECT value, kind FROM settings WHERE key=?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        row.map(|(value, kind)| {
            SettingValue::decode(&kind, &value)
                .map_err(|err| StoreError::InvalidInput(err.message()))
        })
        .transpose()
    }

    pub fn setting_update(&mut self, key: &str, value: SettingValue) -> Result<(), StoreError> {
        let key = canonical_key(key)?;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let updated = tx.execute(
            "UPDATE settings SET value=?2, kind=?3, updated_at_ms=?4 WHERE key=?1",
            params![key, value.encode(), value.kind(), now_ms],
        )?;
        if updated == 0 {
            return Err(StoreError::UnknownSetting);
        }

        tx.commit()?;
        Ok(())
    }

    pub fn settings_all(&self) -> Result<Vec<(String, SettingValue)>, StoreError> {
        let mut stmt =
            self.conn
                .prepare("SELECT key, value, kind FROM settings ORDER BY key ASC")?;

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let key = row.get::<_, String>(0)?;
            let value = row.get::<_, String>(1)?;
            let kind = row.get::<_, String>(2)?;
            let value = SettingValue::decode(&kind, &value)
                .map_err(|err| StoreError::InvalidInput(err.message()))?;
            out.push((key, value));
        }
        Ok(out)
    }
}

fn canonical_key(key: &str) -> Result<&str, StoreError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(StoreError::InvalidInput("setting key must not be empty"));
    }
    Ok(key)
}
