//! vecgate key-value cache
//!
//! Upstash Redis REST client and the weather lookup cached on top of it

mod store;
mod upstash;
mod weather;

pub use store::KvStore;
pub use upstash::UpstashRedisClient;
pub use weather::{
    validate_city, WeatherApiClient, WeatherLookup, WeatherProvider, WeatherService,
    MAX_CITY_LEN,
};
