#![forbid(unsafe_code)]

use tf_core::SettingValue;
use tf_storage::StoreError;

use crate::error::ServiceError;
use crate::store::SettingsStore;

/// Typed key-value configuration living next to the timeline data.
pub struct SettingsService<S> {
    store: S,
}

impl<S: SettingsStore> SettingsService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn create(&mut self, key: &str, value: SettingValue) -> Result<(), ServiceError> {
        Ok(self.store.setting_create(key, value)?)
    }

    pub fn get(&self, key: &str) -> Result<SettingValue, ServiceError> {
        self.store
            .setting_get(key)?
            .ok_or(ServiceError::NotFound("setting"))
    }

    pub fn update(&mut self, key: &str, value: SettingValue) -> Result<(), ServiceError> {
        match self.store.setting_update(key, value) {
            Ok(()) => Ok(()),
            Err(StoreError::UnknownSetting) => Err(ServiceError::NotFound("setting")),
            Err(err) => Err(ServiceError::Storage(err)),
        }
    }

    pub fn all(&self) -> Result<Vec<(String, SettingValue)>, ServiceError> {
        Ok(self.store.settings_all()?)
    }
}
