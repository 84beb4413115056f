#![forbid(unsafe_code)]

use tf_core::{Game, GameId};
use tf_storage::CreateGameRequest;

use crate::error::ServiceError;
use crate::store::GameStore;

/// Save-slot registry. One game owns many branches; deleting games is
/// deliberately not offered, the history under them is append-only.
pub struct GameService<S> {
    store: S,
}

impl<S: GameStore> GameService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Registers a game under a freshly minted id.
    pub fn create(&mut self, name: &str) -> Result<Game, ServiceError> {
        let game = self.store.create_game(CreateGameRequest {
            id: GameId::new(),
            name: name.to_string(),
        })?;

        tracing::info!(game = %game.id, name = %game.name, "game created");
        Ok(game)
    }

    pub fn get(&self, id: GameId) -> Result<Game, ServiceError> {
        self.store
            .get_game(id)?
            .ok_or(ServiceError::NotFound("game"))
    }
}
