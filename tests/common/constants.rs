//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (user credentials, profile fields, etc.),
//! update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Artist test user name
pub const ARTIST_USER: &str = "testartist";

/// Artist test user email
pub const ARTIST_EMAIL: &str = "testartist@example.com";

/// Artist test user password
pub const ARTIST_PASS: &str = "Testpass123!";

/// Viewer/Student test user name
pub const STUDENT_USER: &str = "teststudent";

/// Viewer/Student test user email
pub const STUDENT_EMAIL: &str = "teststudent@example.com";

/// Viewer/Student test user password
pub const STUDENT_PASS: &str = "Studentpass123!";

/// Institution test user name
pub const INSTITUTION_USER: &str = "testinstitution";

/// Institution test user email
pub const INSTITUTION_EMAIL: &str = "testinstitution@example.com";

/// Institution test user password
pub const INSTITUTION_PASS: &str = "Institutionpass123!";

/// Service provider test user name
pub const PROVIDER_USER: &str = "testprovider";

/// Service provider test user email
pub const PROVIDER_EMAIL: &str = "testprovider@example.com";

/// Service provider test user password
pub const PROVIDER_PASS: &str = "Providerpass123!";

// ============================================================================
// Test Profile Metadata
// ============================================================================

/// Art form shared by the artist and student fixtures
pub const ARTIST_ART_FORM: &str = "Painting";

/// Specialisation of the artist fixture
pub const ARTIST_SPECIALISATION: &str = "Watercolour";

/// University affiliation of the institution fixture
pub const INSTITUTION_AFFILIATION: &str = "Test University";

/// Registration id of the institution fixture
pub const INSTITUTION_REGISTRATION_ID: &str = "REG-42-TEST";

/// Owner name of the service provider fixture
pub const PROVIDER_OWNER_NAME: &str = "Test Owner";

/// Postal code used by location-bearing fixtures
pub const FIXTURE_POSTAL_CODE: &str = "560001";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
