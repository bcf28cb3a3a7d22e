//! Sample data used to synthesize plausible log lines

/// Sample users
pub const USERS: &[&str] = &["alice", "bob", "charlie", "diana", "eve"];

/// Sample API endpoints
pub const ENDPOINTS: &[&str] = &[
    "/api/users",
    "/api/orders",
    "/api/products",
    "/api/health",
    "/api/login",
];

/// Verbs used in info messages
pub const ACTIONS: &[&str] = &["created", "updated", "deleted", "fetched", "validated"];

/// Canned failure descriptions
pub const ERRORS: &[&str] = &[
    "Connection timeout to database",
    "Invalid authentication token",
    "Rate limit exceeded",
    "Service unavailable",
    "NULL pointer exception",
];

/// HTTP method recorded for every request observation
pub const REQUEST_METHOD: &str = "GET";
