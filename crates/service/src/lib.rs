#![forbid(unsafe_code)]

mod error;
mod games;
mod settings;
mod store;
mod support;
mod timelines;

pub use error::ServiceError;
pub use games::GameService;
pub use settings::SettingsService;
pub use store::{GameStore, SettingsStore, TimelineStore};
pub use timelines::TimelineService;
