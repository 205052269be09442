//! # ImageFeed Types
//!
//! Domain models and raw API record types for the ImageFeed client.
//!
//! - **`models`** - Domain models (Photo, Profile, OAuth token response)
//!
//! All types are designed to be:
//! - **Deserializable** via serde from the photo API's JSON
//! - **Clone** for cheap sharing across async boundaries
//! - **PartialEq** for testing and comparison

pub mod models;

// Re-export core model types
pub use models::{
    OAuthTokenResponse, Photo, PhotoRecord, PhotoSize, PhotoUrls, Profile, ProfileImageRecord,
    ProfileRecord, UserRecord,
};
