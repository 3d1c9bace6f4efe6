// =============================================================================
// Swipeline Backend Constants
// =============================================================================
// This file contains all constants used throughout the backend to enable
// easy tuning and configuration from a single location.

// =============================================================================
// GESTURE TRACKING
// =============================================================================

/// Horizontal/vertical travel (px) a drag must reach to count as a swipe
pub const DEFAULT_SWIPE_THRESHOLD_PX: f64 = 100.0;

/// Degrees of card rotation per pixel of horizontal travel
pub const ROTATION_PER_PX: f64 = 0.1;

/// Maximum card rotation in either direction (degrees)
pub const MAX_ROTATION_DEG: f64 = 15.0;

/// Card scale while it is lifted under the pointer
pub const LIFTED_SCALE: f64 = 1.05;

/// Card scale at rest
pub const RESTING_SCALE: f64 = 1.0;

// =============================================================================
// COMPATIBILITY SCORING
// =============================================================================

/// Score reported when the backend scoring procedure fails
pub const NEUTRAL_COMPATIBILITY_SCORE: u8 = 50;

/// Upper bound of the compatibility scale
pub const MAX_COMPATIBILITY_SCORE: u8 = 100;

/// Default lifetime of a cached compatibility score (5 minutes)
pub const DEFAULT_COMPATIBILITY_CACHE_TTL_SECS: u64 = 300;

// =============================================================================
// REWINDS
// =============================================================================

/// Rewinds per local day on the free plan
pub const FREE_DAILY_REWINDS: i64 = 1;

/// Rewinds per local day on the plus plan
pub const PLUS_DAILY_REWINDS: i64 = 5;

// =============================================================================
// MESSAGES
// =============================================================================

/// Error message returned when a like already exists for the pair
pub const ALREADY_LIKED_MESSAGE: &str = "Already liked this profile";

/// Error message returned when no session accompanies a request
pub const UNAUTHENTICATED_MESSAGE: &str = "Not authenticated";

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default server port if not specified in environment
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default database pool size
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Time zone used to compute "today" when none is configured
pub const DEFAULT_TIMEZONE: &str = "UTC";
