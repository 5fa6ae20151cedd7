//! Async task management for non-blocking API operations.
//!
//! Remote calls run in background tasks so the UI keeps rendering. Results
//! come back to the main event loop over a tokio channel.
//!
//! # Architecture
//!
//! 1. The cities screen returns a [`Command`] instead of performing I/O
//! 2. The app hands the command to [`TaskSpawner::spawn`] together with the
//!    current mount generation
//! 3. The main loop keeps rendering and handling keys
//! 4. When the task completes it sends an [`ApiMessage`] through the channel
//! 5. The main loop polls the channel with `try_recv()` and hands the result
//!    back to the app, which drops it if the generation has moved on

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::{ApiError, City, CityBackend, Country, NewCity};
use crate::cities::{Command, Generation};

/// Messages sent from background tasks to the main event loop.
///
/// Every variant carries the generation the request was issued under.
#[derive(Debug)]
pub enum ApiMessage {
    /// City list fetched (initial load, reload or post-mutation refresh)
    CitiesFetched {
        generation: Generation,
        result: Result<Vec<City>, ApiError>,
    },

    /// Country list fetched
    CountriesFetched {
        generation: Generation,
        result: Result<Vec<Country>, ApiError>,
    },

    /// City created
    CityCreated {
        generation: Generation,
        result: Result<City, ApiError>,
    },

    /// City overwritten
    CityUpdated {
        generation: Generation,
        id: i64,
        result: Result<City, ApiError>,
    },

    /// City deleted
    CityDeleted {
        generation: Generation,
        id: i64,
        result: Result<(), ApiError>,
    },
}

impl ApiMessage {
    /// Generation the originating request was issued under.
    pub fn generation(&self) -> Generation {
        match self {
            ApiMessage::CitiesFetched { generation, .. }
            | ApiMessage::CountriesFetched { generation, .. }
            | ApiMessage::CityCreated { generation, .. }
            | ApiMessage::CityUpdated { generation, .. }
            | ApiMessage::CityDeleted { generation, .. } => *generation,
        }
    }
}

/// Spawns background tasks for remote operations.
///
/// Holds the channel sender and the backend; each spawn method clones both
/// into a tokio task that sends its result through the channel.
#[derive(Clone)]
pub struct TaskSpawner {
    tx: mpsc::UnboundedSender<ApiMessage>,
    backend: Arc<dyn CityBackend>,
}

impl TaskSpawner {
    /// Create a new TaskSpawner with the given channel sender and backend.
    pub fn new(tx: mpsc::UnboundedSender<ApiMessage>, backend: Arc<dyn CityBackend>) -> Self {
        Self { tx, backend }
    }

    /// Run a command issued by the cities screen.
    pub fn spawn(&self, command: Command, generation: Generation) {
        debug!(?command, generation, "Spawning task");
        match command {
            Command::LoadCities => self.spawn_fetch_cities(generation),
            Command::LoadCountries => self.spawn_fetch_countries(generation),
            Command::CreateCity(city) => self.spawn_create_city(city, generation),
            Command::UpdateCity(city) => self.spawn_update_city(city, generation),
            Command::DeleteCity(id) => self.spawn_delete_city(id, generation),
        }
    }

    /// Spawn a task to fetch all cities.
    pub fn spawn_fetch_cities(&self, generation: Generation) {
        let tx = self.tx.clone();
        let backend = self.backend.clone();
        tokio::spawn(async move {
            let result = backend.list_cities().await;
            let _ = tx.send(ApiMessage::CitiesFetched { generation, result });
        });
    }

    /// Spawn a task to fetch all countries.
    pub fn spawn_fetch_countries(&self, generation: Generation) {
        let tx = self.tx.clone();
        let backend = self.backend.clone();
        tokio::spawn(async move {
            let result = backend.list_countries().await;
            let _ = tx.send(ApiMessage::CountriesFetched { generation, result });
        });
    }

    /// Spawn a task to create a city.
    pub fn spawn_create_city(&self, city: NewCity, generation: Generation) {
        let tx = self.tx.clone();
        let backend = self.backend.clone();
        tokio::spawn(async move {
            let result = backend.create_city(city).await;
            let _ = tx.send(ApiMessage::CityCreated { generation, result });
        });
    }

    /// Spawn a task to overwrite a city.
    pub fn spawn_update_city(&self, city: City, generation: Generation) {
        let tx = self.tx.clone();
        let backend = self.backend.clone();
        let id = city.id.unwrap_or(0);
        tokio::spawn(async move {
            let result = backend.update_city(city).await;
            let _ = tx.send(ApiMessage::CityUpdated {
                generation,
                id,
                result,
            });
        });
    }

    /// Spawn a task to delete a city.
    pub fn spawn_delete_city(&self, id: i64, generation: Generation) {
        let tx = self.tx.clone();
        let backend = self.backend.clone();
        tokio::spawn(async move {
            let result = backend.delete_city(id).await;
            let _ = tx.send(ApiMessage::CityDeleted {
                generation,
                id,
                result,
            });
        });
    }
}

/// Create a new task channel and spawner.
///
/// Returns a tuple of (receiver, spawner). The receiver should be polled
/// in the main event loop, and the spawner should be used to spawn tasks.
pub fn create_task_channel(
    backend: Arc<dyn CityBackend>,
) -> (mpsc::UnboundedReceiver<ApiMessage>, TaskSpawner) {
    let (tx, rx) = mpsc::unbounded_channel();
    (rx, TaskSpawner::new(tx, backend))
}
