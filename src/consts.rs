//! Global constants and configuration defaults.

pub const DEFAULT_HTTP_PORT: u16 = 4000; // Port used when HTTP_PORT is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/telecare.db";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5; // Small fixed pool, one process serves everything.
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650; // Ten years.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_UPLOADS_DIR: &str = "./data/uploads"; // Uploaded medical record files.

pub const ACCESS_CONTROL_MODEL: &str = "access_control/model.conf";
pub const ACCESS_CONTROL_POLICY: &str = "access_control/policy.csv";

pub const TOKEN_COOKIE: &str = "token"; // Name of the httpOnly cookie carrying the JWT.
pub const FILES_ROUTE: &str = "/api/medical-records/files";
