//! Core domain models for the ImageFeed client.
//!
//! Raw `*Record` types mirror the wire JSON exactly; the plain types are
//! what the services cache and hand to observers.

mod photo;
mod profile;
mod token;

// Re-export all models
pub use photo::{Photo, PhotoRecord, PhotoSize, PhotoUrls};
pub use profile::{Profile, ProfileImageRecord, ProfileRecord, UserRecord};
pub use token::OAuthTokenResponse;
