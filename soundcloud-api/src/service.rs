//! Typed endpoint surface of the SoundCloud API.
//!
//! See <https://developers.soundcloud.com/docs/api/reference>.

use serde::de::DeserializeOwned;

use crate::client::SoundCloudApi;
use crate::error::ApiResult;
use crate::models::Comment;
use crate::models::Connection;
use crate::models::Group;
use crate::models::Playlist;
use crate::models::SecretToken;
use crate::models::Track;
use crate::models::User;
use crate::models::WebProfile;
use crate::query::QueryMap;

impl SoundCloudApi {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.get_json(path, std::iter::empty::<(&str, &str)>()).await
    }

    async fn search<T: DeserializeOwned>(&self, path: &str, q: &str) -> ApiResult<T> {
        self.get_json(path, [("q", q)]).await
    }

    // Tracks

    pub async fn search_tracks(&self, query: &str) -> ApiResult<Vec<Track>> {
        self.search("tracks", query).await
    }

    /// Searches tracks with a map built by [`TrackQuery`](crate::TrackQuery)
    /// or a [`Pager`](crate::Pager).
    pub async fn search_tracks_with(&self, query: &QueryMap) -> ApiResult<Vec<Track>> {
        self.get_json("tracks", query).await
    }

    pub async fn track(&self, track_id: &str) -> ApiResult<Track> {
        self.get(&format!("tracks/{track_id}")).await
    }

    pub async fn track_comments(&self, track_id: &str) -> ApiResult<Vec<Comment>> {
        self.get(&format!("tracks/{track_id}/comments")).await
    }

    pub async fn track_comment(&self, track_id: &str, comment_id: &str) -> ApiResult<Comment> {
        self.get(&format!("tracks/{track_id}/comments/{comment_id}"))
            .await
    }

    pub async fn track_favoriters(&self, track_id: &str) -> ApiResult<Vec<User>> {
        self.get(&format!("tracks/{track_id}/favoriters")).await
    }

    pub async fn track_favoriter(&self, track_id: &str, user_id: &str) -> ApiResult<User> {
        self.get(&format!("tracks/{track_id}/favoriters/{user_id}"))
            .await
    }

    pub async fn track_secret_token(&self, track_id: &str) -> ApiResult<SecretToken> {
        self.get(&format!("tracks/{track_id}/secret-token")).await
    }

    // Users

    pub async fn search_users(&self, query: &str) -> ApiResult<Vec<User>> {
        self.search("users", query).await
    }

    pub async fn user(&self, user_id: &str) -> ApiResult<User> {
        self.get(&format!("users/{user_id}")).await
    }

    pub async fn user_tracks(&self, user_id: &str) -> ApiResult<Vec<Track>> {
        self.get(&format!("users/{user_id}/tracks")).await
    }

    pub async fn user_playlists(&self, user_id: &str) -> ApiResult<Vec<Playlist>> {
        self.get(&format!("users/{user_id}/playlists")).await
    }

    pub async fn user_followings(&self, user_id: &str) -> ApiResult<Vec<User>> {
        self.get(&format!("users/{user_id}/followings")).await
    }

    pub async fn user_following(&self, user_id: &str, following_id: &str) -> ApiResult<User> {
        self.get(&format!("users/{user_id}/followings/{following_id}"))
            .await
    }

    pub async fn user_followers(&self, user_id: &str) -> ApiResult<Vec<User>> {
        self.get(&format!("users/{user_id}/followers")).await
    }

    pub async fn user_follower(&self, user_id: &str, follower_id: &str) -> ApiResult<User> {
        self.get(&format!("users/{user_id}/followers/{follower_id}"))
            .await
    }

    pub async fn user_comments(&self, user_id: &str) -> ApiResult<Vec<Comment>> {
        self.get(&format!("users/{user_id}/comments")).await
    }

    pub async fn user_favorites(&self, user_id: &str) -> ApiResult<Vec<Track>> {
        self.get(&format!("users/{user_id}/favorites")).await
    }

    pub async fn user_favorite(&self, user_id: &str, favorite_id: &str) -> ApiResult<Track> {
        self.get(&format!("users/{user_id}/favorites/{favorite_id}"))
            .await
    }

    pub async fn user_groups(&self, user_id: &str) -> ApiResult<Vec<Group>> {
        self.get(&format!("users/{user_id}/groups")).await
    }

    pub async fn user_web_profiles(&self, user_id: &str) -> ApiResult<Vec<WebProfile>> {
        self.get(&format!("users/{user_id}/web-profiles")).await
    }

    // Playlists

    pub async fn search_playlists(&self, query: &str) -> ApiResult<Vec<Playlist>> {
        self.search("playlists", query).await
    }

    /// `representation` is `"compact"` or `"id"`.
    pub async fn search_playlists_as(
        &self,
        query: &str,
        representation: &str,
    ) -> ApiResult<Vec<Playlist>> {
        self.get_json("playlists", [("q", query), ("representation", representation)])
            .await
    }

    pub async fn playlist(&self, playlist_id: &str) -> ApiResult<Playlist> {
        self.get(&format!("playlists/{playlist_id}")).await
    }

    pub async fn playlist_secret_token(&self, playlist_id: &str) -> ApiResult<SecretToken> {
        self.get(&format!("playlists/{playlist_id}/secret-token"))
            .await
    }

    // Groups

    pub async fn search_groups(&self, query: &str) -> ApiResult<Vec<Group>> {
        self.search("groups", query).await
    }

    pub async fn group(&self, group_id: &str) -> ApiResult<Group> {
        self.get(&format!("groups/{group_id}")).await
    }

    pub async fn group_moderators(&self, group_id: &str) -> ApiResult<Vec<User>> {
        self.get(&format!("groups/{group_id}/moderators")).await
    }

    pub async fn group_members(&self, group_id: &str) -> ApiResult<Vec<User>> {
        self.get(&format!("groups/{group_id}/members")).await
    }

    pub async fn group_contributors(&self, group_id: &str) -> ApiResult<Vec<User>> {
        self.get(&format!("groups/{group_id}/contributors")).await
    }

    pub async fn group_users(&self, group_id: &str) -> ApiResult<Vec<User>> {
        self.get(&format!("groups/{group_id}/users")).await
    }

    pub async fn group_pending_tracks(&self, group_id: &str) -> ApiResult<Vec<Track>> {
        self.get(&format!("groups/{group_id}/pending_tracks")).await
    }

    pub async fn group_pending_track(&self, group_id: &str, track_id: &str) -> ApiResult<Track> {
        self.get(&format!("groups/{group_id}/pending_tracks/{track_id}"))
            .await
    }

    pub async fn group_contributions(&self, group_id: &str) -> ApiResult<Vec<Track>> {
        self.get(&format!("groups/{group_id}/contributions")).await
    }

    pub async fn group_contribution(&self, group_id: &str, track_id: &str) -> ApiResult<Track> {
        self.get(&format!("groups/{group_id}/contributions/{track_id}"))
            .await
    }

    // Authenticated user. These require a token; see `set_token`.

    pub async fn me(&self) -> ApiResult<User> {
        self.get("me").await
    }

    pub async fn my_tracks(&self) -> ApiResult<Vec<Track>> {
        self.get("me/tracks").await
    }

    pub async fn my_playlists(&self) -> ApiResult<Vec<Playlist>> {
        self.get("me/playlists").await
    }

    pub async fn my_followings(&self) -> ApiResult<Vec<User>> {
        self.get("me/followings").await
    }

    pub async fn my_following(&self, following_id: &str) -> ApiResult<User> {
        self.get(&format!("me/followings/{following_id}")).await
    }

    pub async fn my_followers(&self) -> ApiResult<Vec<User>> {
        self.get("me/followers").await
    }

    pub async fn my_follower(&self, follower_id: &str) -> ApiResult<User> {
        self.get(&format!("me/followers/{follower_id}")).await
    }

    pub async fn my_comments(&self) -> ApiResult<Vec<Comment>> {
        self.get("me/comments").await
    }

    pub async fn my_favorites(&self) -> ApiResult<Vec<Track>> {
        self.get("me/favorites").await
    }

    pub async fn my_favorite(&self, favorite_id: &str) -> ApiResult<Track> {
        self.get(&format!("me/favorites/{favorite_id}")).await
    }

    pub async fn my_groups(&self) -> ApiResult<Vec<Group>> {
        self.get("me/groups").await
    }

    pub async fn my_web_profiles(&self) -> ApiResult<Vec<WebProfile>> {
        self.get("me/web-profiles").await
    }

    pub async fn my_connections(&self) -> ApiResult<Vec<Connection>> {
        self.get("me/connections").await
    }

    pub async fn my_connection(&self, connection_id: &str) -> ApiResult<Connection> {
        self.get(&format!("me/connections/{connection_id}")).await
    }
}
