//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (seeded catalog entries, timeouts, etc.),
//! update only this file.

// ============================================================================
// Seeded Catalog Metadata
// ============================================================================

/// Publisher seeded with the Dune book
pub const PUBLISHER_ACE_NAME: &str = "Ace Books";

/// Publisher seeded without books
pub const PUBLISHER_TOR_NAME: &str = "Tor Books";

/// Author linked to the seeded book
pub const AUTHOR_HERBERT_NAME: &str = "Frank Herbert";

/// Author seeded without books
pub const AUTHOR_ANDERSON_NAME: &str = "Kevin J. Anderson";

/// Seeded book title
pub const BOOK_DUNE_NAME: &str = "Dune";

/// Seeded book ISBN
pub const BOOK_DUNE_ISBN: &str = "9780441013593";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
