//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all music-catalog-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;

/// HTTP test client. The access token is sent as a bearer header,
/// the refresh token travels in the cookie store.
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    access_token: Mutex<Option<String>>,
}

/// Fields of a song upload
pub struct SongForm<'a> {
    pub title: &'a str,
    pub artist: &'a str,
    pub genre: &'a str,
    pub duration: Option<i64>,
    pub filename: &'a str,
}

impl Default for SongForm<'_> {
    fn default() -> Self {
        SongForm {
            title: "Song A",
            artist: "Uploader Band",
            genre: "rock",
            duration: Some(180),
            filename: "song-a.mp3",
        }
    }
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication flows.
    /// For most tests, use `authenticated()` or `authenticated_admin()` instead.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Keeps the refresh cookie
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            access_token: Mutex::new(None),
        }
    }

    /// Creates a client logged in with the given credentials
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated_as(base_url: String, email: &str, password: &str) -> Self {
        let client = Self::new(base_url);
        client.login_and_keep(email, password).await;
        client
    }

    /// Creates a client pre-authenticated as a regular user
    ///
    /// This is the most common way to create a test client.
    pub async fn authenticated(base_url: String) -> Self {
        Self::authenticated_as(base_url, TEST_EMAIL, TEST_PASS).await
    }

    /// Creates a client pre-authenticated as the second regular user
    pub async fn authenticated_other(base_url: String) -> Self {
        Self::authenticated_as(base_url, OTHER_EMAIL, OTHER_PASS).await
    }

    /// Creates a client pre-authenticated as an admin user
    ///
    /// Use this for testing admin-only endpoints.
    pub async fn authenticated_admin(base_url: String) -> Self {
        Self::authenticated_as(base_url, ADMIN_EMAIL, ADMIN_PASS).await
    }

    /// The current access token, if any
    pub fn access_token(&self) -> Option<String> {
        self.access_token.lock().unwrap().clone()
    }

    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.lock().unwrap() = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Response {
        self.authorize(builder)
            .send()
            .await
            .expect("Request failed")
    }

    async fn get(&self, path: &str) -> Response {
        self.send(self.client.get(self.url(path))).await
    }

    async fn post_json(&self, path: &str, body: Value) -> Response {
        self.send(self.client.post(self.url(path)).json(&body)).await
    }

    async fn put_json(&self, path: &str, body: Value) -> Response {
        self.send(self.client.put(self.url(path)).json(&body)).await
    }

    async fn patch_json(&self, path: &str, body: Value) -> Response {
        self.send(self.client.patch(self.url(path)).json(&body)).await
    }

    async fn delete(&self, path: &str) -> Response {
        self.send(self.client.delete(self.url(path))).await
    }

    /// Stores the access token carried by a successful auth response body
    async fn keep_access_token(&self, response: Response) -> Value {
        let body: Value = response.json().await.expect("Invalid JSON body");
        if let Some(access) = body["access"].as_str() {
            self.set_access_token(Some(access.to_string()));
        }
        body
    }

    // ========================================================================
    // Account Endpoints
    // ========================================================================

    /// POST /v1/accounts/register
    pub async fn register(&self, body: Value) -> Response {
        self.client
            .post(self.url("/accounts/register"))
            .json(&body)
            .send()
            .await
            .expect("Register request failed")
    }

    /// Registers a user and keeps its access token. Returns the response body.
    pub async fn register_and_keep(&self, username: &str, user_type: &str) -> Value {
        let response = self
            .register(json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "longenough1",
                "password_confirm": "longenough1",
                "first_name": "",
                "last_name": "",
                "user_type": user_type,
            }))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        self.keep_access_token(response).await
    }

    /// POST /v1/accounts/login. Does not touch the kept access token.
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.client
            .post(self.url("/accounts/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// Logs in and keeps the access token. Returns the response body.
    ///
    /// # Panics
    ///
    /// Panics if the login is rejected.
    pub async fn login_and_keep(&self, email: &str, password: &str) -> Value {
        let response = self.login(email, password).await;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            panic!(
                "Authentication of {} failed with {}: {:?}",
                email,
                status,
                response.text().await
            );
        }
        self.keep_access_token(response).await
    }

    /// POST /v1/accounts/logout
    pub async fn logout(&self) -> Response {
        self.send(self.client.post(self.url("/accounts/logout"))).await
    }

    /// POST /v1/accounts/refresh with an explicit token in the body
    pub async fn refresh_with(&self, refresh: &str) -> Response {
        self.client
            .post(self.url("/accounts/refresh"))
            .json(&json!({ "refresh": refresh }))
            .send()
            .await
            .expect("Refresh request failed")
    }

    /// POST /v1/accounts/refresh relying on the refresh cookie
    pub async fn refresh_from_cookie(&self) -> Response {
        self.client
            .post(self.url("/accounts/refresh"))
            .send()
            .await
            .expect("Refresh request failed")
    }

    /// GET /v1/accounts/profile
    pub async fn get_profile(&self) -> Response {
        self.get("/accounts/profile").await
    }

    /// PATCH /v1/accounts/profile
    pub async fn update_profile(&self, body: Value) -> Response {
        self.patch_json("/accounts/profile", body).await
    }

    /// POST /v1/accounts/change-password
    pub async fn change_password(&self, current: &str, new: &str) -> Response {
        self.post_json(
            "/accounts/change-password",
            json!({ "current_password": current, "new_password": new }),
        )
        .await
    }

    // ========================================================================
    // Song Endpoints
    // ========================================================================

    /// GET /v1/songs?<query>
    pub async fn list_songs(&self, query: &str) -> Response {
        self.get(&format!("/songs?{}", query)).await
    }

    /// POST /v1/songs (multipart)
    pub async fn upload_song(&self, song: SongForm<'_>) -> Response {
        let mut form = Form::new()
            .text("title", song.title.to_string())
            .text("artist", song.artist.to_string())
            .text("genre", song.genre.to_string())
            .part(
                "audio_file",
                Part::bytes(TEST_AUDIO_BYTES.to_vec()).file_name(song.filename.to_string()),
            );
        if let Some(duration) = song.duration {
            form = form.text("duration", duration.to_string());
        }
        self.send(self.client.post(self.url("/songs")).multipart(form))
            .await
    }

    /// GET /v1/songs/{id}
    pub async fn get_song(&self, id: i64) -> Response {
        self.get(&format!("/songs/{}", id)).await
    }

    /// PATCH /v1/songs/{id}
    pub async fn update_song(&self, id: i64, body: Value) -> Response {
        self.patch_json(&format!("/songs/{}", id), body).await
    }

    /// DELETE /v1/songs/{id}
    pub async fn delete_song(&self, id: i64) -> Response {
        self.delete(&format!("/songs/{}", id)).await
    }

    /// GET /v1/songs/{id}/download
    pub async fn download_song(&self, id: i64) -> Response {
        self.get(&format!("/songs/{}/download", id)).await
    }

    /// GET on a server-relative URL such as a media file URL
    pub async fn get_absolute(&self, path: &str) -> Response {
        self.send(self.client.get(format!("{}{}", self.base_url, path)))
            .await
    }

    // ========================================================================
    // Playlist Endpoints
    // ========================================================================

    /// GET /v1/playlists?<query>
    pub async fn list_playlists(&self, query: &str) -> Response {
        self.get(&format!("/playlists?{}", query)).await
    }

    /// POST /v1/playlists
    pub async fn create_playlist(&self, name: &str, is_public: bool) -> Response {
        self.post_json(
            "/playlists",
            json!({ "name": name, "description": "", "is_public": is_public }),
        )
        .await
    }

    /// Creates a playlist and returns its id
    pub async fn create_playlist_id(&self, name: &str, is_public: bool) -> i64 {
        let response = self.create_playlist(name, is_public).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let body: Value = response.json().await.unwrap();
        body["id"].as_i64().expect("playlist id")
    }

    /// GET /v1/playlists/{id}
    pub async fn get_playlist(&self, id: i64) -> Response {
        self.get(&format!("/playlists/{}", id)).await
    }

    /// PUT /v1/playlists/{id}
    pub async fn update_playlist(&self, id: i64, body: Value) -> Response {
        self.put_json(&format!("/playlists/{}", id), body).await
    }

    /// DELETE /v1/playlists/{id}
    pub async fn delete_playlist(&self, id: i64) -> Response {
        self.delete(&format!("/playlists/{}", id)).await
    }

    /// POST /v1/playlists/{id}/add_song
    pub async fn add_song_to_playlist(&self, playlist_id: i64, song_id: i64) -> Response {
        self.post_json(
            &format!("/playlists/{}/add_song", playlist_id),
            json!({ "song_id": song_id }),
        )
        .await
    }

    /// DELETE /v1/playlists/{id}/remove_song
    pub async fn remove_song_from_playlist(&self, playlist_id: i64, song_id: i64) -> Response {
        self.send(
            self.client
                .delete(self.url(&format!("/playlists/{}/remove_song", playlist_id)))
                .json(&json!({ "song_id": song_id })),
        )
        .await
    }

    /// GET /v1/playlists/{id}/songs
    pub async fn playlist_songs(&self, playlist_id: i64) -> Response {
        self.get(&format!("/playlists/{}/songs", playlist_id)).await
    }

    // ========================================================================
    // Play Log Endpoints
    // ========================================================================

    /// POST /v1/play-logs
    pub async fn log_play(&self, body: Value) -> Response {
        self.post_json("/play-logs", body).await
    }

    /// GET /v1/play-logs?<query>
    pub async fn list_play_logs(&self, query: &str) -> Response {
        self.get(&format!("/play-logs?{}", query)).await
    }

    /// GET /v1/play-logs/{id}
    pub async fn get_play_log(&self, id: i64) -> Response {
        self.get(&format!("/play-logs/{}", id)).await
    }

    /// GET /v1/play-logs/my_stats
    pub async fn my_stats(&self) -> Response {
        self.get("/play-logs/my_stats").await
    }

    /// GET /v1/play-logs/global_stats
    pub async fn global_stats(&self) -> Response {
        self.get("/play-logs/global_stats").await
    }

    // ========================================================================
    // Notification Endpoints
    // ========================================================================

    /// GET /v1/notifications?<query>
    pub async fn list_notifications(&self, query: &str) -> Response {
        self.get(&format!("/notifications?{}", query)).await
    }

    /// Every notification of the caller as JSON values
    pub async fn notifications(&self) -> Vec<Value> {
        let response = self.list_notifications("page_size=100").await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        body["results"].as_array().cloned().unwrap_or_default()
    }

    /// POST /v1/notifications
    pub async fn create_notification(&self, body: Value) -> Response {
        self.post_json("/notifications", body).await
    }

    /// GET /v1/notifications/{id}
    pub async fn get_notification(&self, id: i64) -> Response {
        self.get(&format!("/notifications/{}", id)).await
    }

    /// DELETE /v1/notifications/{id}
    pub async fn delete_notification(&self, id: i64) -> Response {
        self.delete(&format!("/notifications/{}", id)).await
    }

    /// POST /v1/notifications/{id}/mark_read
    pub async fn mark_notification_read(&self, id: i64) -> Response {
        self.send(
            self.client
                .post(self.url(&format!("/notifications/{}/mark_read", id))),
        )
        .await
    }

    /// POST /v1/notifications/mark_all_read
    pub async fn mark_all_notifications_read(&self, ids: Option<Vec<i64>>) -> Response {
        let builder = self.client.post(self.url("/notifications/mark_all_read"));
        let builder = match ids {
            Some(ids) => builder.json(&json!({ "notification_ids": ids })),
            None => builder,
        };
        self.send(builder).await
    }

    /// GET /v1/notifications/unread_count
    pub async fn unread_count(&self) -> Response {
        self.get("/notifications/unread_count").await
    }

    /// DELETE /v1/notifications/clear_all
    pub async fn clear_notifications(&self) -> Response {
        self.delete("/notifications/clear_all").await
    }

    // ========================================================================
    // Dashboard Endpoints
    // ========================================================================

    /// GET /v1/dashboard/stats
    pub async fn dashboard_stats(&self) -> Response {
        self.get("/dashboard/stats").await
    }
}
