//! Constants used throughout the ctrls core crate.

/// Backend base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Request timeout, in seconds, used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Location of the persisted staff auth state when none is configured.
pub const DEFAULT_AUTH_FILE: &str = ".ctrls/auth.json";

/// Theme variable that carries the clinic's primary color.
pub const PRIMARY_THEME_VARIABLE: &str = "--primary";

/// Header carrying the tenant (clinic) identifier on protected requests.
pub const CLINIC_ID_HEADER: &str = "X-Clinic-ID";

/// Listing defaults used by the staff dashboard.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SUBMISSIONS_SORT: &str = "createdAt,desc";
