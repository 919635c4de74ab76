//! Client for the SoundCloud public REST API.
//!
//! [`SoundCloudApi`] owns the HTTP client and attaches the application's
//! `client_id` (and the user's `oauth_token`, once one has been set) to every
//! request it sends. Authentication itself lives in the `soundcloud-auth`
//! crate, which exchanges authorization codes through the same client.
//!
//! ```rust,ignore
//! use soundcloud_api::SoundCloudApi;
//! use soundcloud_api::query::{Pager, TrackQuery};
//!
//! let api = SoundCloudApi::new("my-client-id")?;
//! let query = TrackQuery::builder().query("lofi").build();
//! let mut pager = Pager::new(&query);
//! let first_page = api.search_tracks_with(pager.map()).await?;
//! let second_page = api.search_tracks_with(pager.next()).await?;
//! ```

mod client;
mod error;
pub mod models;
pub mod query;
mod service;

pub use client::DEFAULT_API_ENDPOINT;
pub use client::SoundCloudApi;
pub use client::SoundCloudApiBuilder;
pub use error::ApiError;
pub use error::ApiResult;
pub use query::Pager;
pub use query::Query;
pub use query::QueryMap;
pub use query::TrackQuery;
