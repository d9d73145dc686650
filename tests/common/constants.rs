//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (user credentials, fixture songs, etc.),
//! update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user name
pub const TEST_USER: &str = "testuser";

/// Regular test user email (login identifier)
pub const TEST_EMAIL: &str = "testuser@example.com";

/// Regular test user password
pub const TEST_PASS: &str = "testpass123";

/// Second regular user, used for cross-user visibility checks
pub const OTHER_USER: &str = "otheruser";

pub const OTHER_EMAIL: &str = "otheruser@example.com";

pub const OTHER_PASS: &str = "otherpass123";

/// Third regular user
pub const THIRD_USER: &str = "thirduser";

pub const THIRD_EMAIL: &str = "thirduser@example.com";

pub const THIRD_PASS: &str = "thirdpass123";

/// Admin test user name
pub const ADMIN_USER: &str = "admin";

pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Admin test user password
pub const ADMIN_PASS: &str = "adminpass123";

/// Number of regular users seeded by the fixtures
pub const SEEDED_REGULAR_USERS: usize = 3;

// ============================================================================
// Test Catalog Metadata
// ============================================================================

/// Title of the song seeded by the fixtures
pub const SEEDED_SONG_TITLE: &str = "Opening Track";

/// Artist of the song seeded by the fixtures
pub const SEEDED_SONG_ARTIST: &str = "The Test Band";

/// Fake MP3 payload used for uploads
pub const TEST_AUDIO_BYTES: &[u8] = b"ID3\x03\x00\x00\x00\x00\x00\x0ffake mp3 frames for tests";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Maximum time to wait for deferred tasks to take effect (milliseconds)
pub const DEFERRED_EFFECT_TIMEOUT_MS: u64 = 3000;

/// JWT secret used by test servers
pub const TEST_JWT_SECRET: &str = "e2e-test-secret";
