//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default shortlist size
pub const DEFAULT_TOP_N: usize = 12;

/// Default sort mode
pub const DEFAULT_SORT_MODE: &str = "timeless";

/// Default radius for local proximity statistics, in kilometers
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Minimum displacement before local stats are recomputed, in kilometers
pub const DEFAULT_MOVEMENT_THRESHOLD_KM: f64 = 1.0;

/// Default hotspot grid cell edge length, in kilometers
pub const DEFAULT_GRID_KM: f64 = 1.0;

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default dataset file path
pub const DEFAULT_DATASET_PATH: &str = "data/occurrences_compact.json";

/// Default optional images file path
pub const DEFAULT_IMAGES_PATH: &str = "data/plants_wikipedia_images.json";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "openstreetmap";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "wilder";
