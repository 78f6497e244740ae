//! Constants and default values used throughout the crate.

/// Default number of cards requested for a flashcard set.
pub const DEFAULT_CARD_COUNT: u32 = 10;
/// Server-side upper bound on cards per set.
pub const MAX_CARD_COUNT: u32 = 20;
/// Default number of questions requested for a quiz.
pub const DEFAULT_QUESTION_COUNT: u32 = 10;

/// Environment variable overriding the configured API base URL at startup.
pub const ENV_API_URL: &str = "STUDYDECK_API_URL";

/// Config file looked up in the current directory.
pub const CONFIG_FILE_LOCAL: &str = "studydeck.toml";
/// Config directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "studydeck";
