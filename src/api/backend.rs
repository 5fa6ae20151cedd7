//! The remote operations the cities screen depends on.

use async_trait::async_trait;

use super::error::Result;
use super::types::{City, Country, NewCity};

/// City and country operations offered by the admin API.
///
/// `CityClient` implements this over HTTP. The screen and the task spawner
/// only ever see `Arc<dyn CityBackend>`.
#[async_trait]
pub trait CityBackend: Send + Sync {
    /// List all cities in server order.
    async fn list_cities(&self) -> Result<Vec<City>>;

    /// Create a city. The server assigns the id.
    async fn create_city(&self, city: NewCity) -> Result<City>;

    /// Overwrite the persisted city identified by `city.id`.
    async fn update_city(&self, city: City) -> Result<City>;

    /// Delete the city with the given id.
    async fn delete_city(&self, id: i64) -> Result<()>;

    /// List all countries.
    async fn list_countries(&self) -> Result<Vec<Country>>;
}

#[cfg(test)]
pub(crate) use in_memory::InMemoryBackend;
