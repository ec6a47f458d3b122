//! # armory-client - Regional Battle.net game-data API client
//!
//! This crate wraps the regional World of Warcraft game-data API:
//!
//! - **Regions**: a region table loaded from a JSON file, one region active at a time
//! - **Authentication**: a static API key, or OAuth client credentials exchanged
//!   for a fresh bearer token on every request
//! - **Realms**: realm lists, optionally refreshed from the API and persisted
//!   back to the region file
//! - **Characters**: profiles behind a 24 hour on-disk read-through cache
//! - **Spells**: live lookups
//! - **Icons**: render CDN images stored per size on disk
//!
//! ## Usage
//!
//! ```rust,no_run
//! use armory_client::{ClientConfig, IconOptions, RegionalApiClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = RegionalApiClient::new(ClientConfig::from_env()).await?;
//!
//!     if client.is_valid_region("eu") {
//!         client.select_region("eu");
//!     }
//!
//!     let realms = client.realms(true).await?;
//!     println!("{} realms", realms.len());
//!
//!     if client.is_valid_realm("draenor") {
//!         let profile = client.character("Thrall", "draenor").await?;
//!         println!("{profile:#}");
//!     }
//!
//!     let icon = client
//!         .icon_image_path("inv_sword_04", &IconOptions::default().with_download(true))
//!         .await?;
//!     println!("{icon:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Files
//!
//! | File | Contents |
//! |------|----------|
//! | `config_file` | `{"key": ...}` or `{"clientKey": ..., "clientSecret": ...}` |
//! | `regions_file` | `{"<code>": {"name": ..., "realms": {"<slug>": "<name>"}}}` |
//! | `<characters_dir>/<region>-<realm>/<name>.json` | `{"cacheTime": ..., "data": ...}` |
//! | `<icons_dir>/<size>/<icon>.jpg` | icon image |

pub mod auth;
pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod region;
pub mod store;
pub mod transport;

pub use cache::CachedCharacter;
pub use client::{DEFAULT_ICON_SIZE, IconOptions, RegionalApiClient};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ClientConfig, ConfigError, Credentials};
pub use error::{ArmoryError, Result};
pub use region::{RealmMap, RegionInfo, RegionSet};
pub use store::StoreError;
