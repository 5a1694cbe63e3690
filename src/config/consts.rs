// src/config/consts.rs

// Net config
pub const BASE_URL: &str = "https://groups.richmond.edu";
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

// Endpoints
pub const LOGIN_PATH: &str = "/login";
pub const GROUPS_PATH: &str = "/groups/mine/?order_by=GROUP_NAME&direction=ASC";
pub const MEMBERS_PATH: &str = "/members";
pub const ADD_MEMBER_PATH: &str = "/members/add";
pub const DEL_MEMBER_PATH: &str = "/members/delete";
pub const SEARCH_PATH: &str = "/members/search/";

// Browser mimicry
pub const SESSION_COOKIE: &str = "catsgroups";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";
pub const SEC_CH_UA: &str = r#""Not;A=Brand";v="99", "Google Chrome";v="139", "Chromium";v="139""#;

// Batch policy
pub const DEFAULT_GROUP: &str = "HPC";
pub const ELIGIBLE_AFFILIATION: &str = "student";

// Local files
pub const LOG_FILE: &str = "log_fast_cats.log";

// Credentials
pub const NETID_ENV: &str = "FAST_CATS_NETID";
pub const PASSWORD_ENV: &str = "FAST_CATS_PASSWORD";
pub const KEYRING_SERVICE: &str = "fast_cats";
