//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Feeding-plan arithmetic
pub mod feeding {
    /// Kilograms per animal per day for each percentage point of a ration
    /// parsed from `"Ingredient: NN%"` text.
    ///
    /// Carried over from the production prompt parser without a documented
    /// derivation; pending confirmation from the product owner.
    pub const KG_PER_PERCENT: f64 = 0.15;

    /// Maximum ingredient rows taken from percentage text
    pub const MAX_INGREDIENTS: usize = 7;

    /// Lines this short are noise for the text heuristics
    pub const MIN_LINE_CHARS: usize = 6;

    /// Nutrition tips must be longer than this many characters
    pub const MIN_TIP_CHARS: usize = 15;
}

/// List caps applied by the response parser
pub mod caps {
    pub const RECOMMENDATIONS: usize = 5;
    pub const FIELD_RECOMMENDATION_WINDOW: usize = 5;
    pub const YIELD_WINDOW: usize = 3;
    pub const RISKS: usize = 3;
    pub const COST_SAVINGS: usize = 5;
    pub const SCHEDULE: usize = 4;
    pub const NUTRITION_TIPS: usize = 3;
    pub const ANALYSIS_BUCKET: usize = 3;
    pub const ANALYSIS_WARNINGS: usize = 2;
}

/// Field analysis prompt anchors
pub mod field {
    /// Nitrogen application cost used in the worked example (tenge per hectare)
    pub const EXAMPLE_COST_PER_HA: f64 = 8000.0;
}

/// Network defaults
pub mod network {
    /// Default completion request timeout (seconds)
    pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

    /// Default weather request timeout (seconds)
    pub const DEFAULT_WEATHER_TIMEOUT_SECS: u64 = 15;

    pub const DEFAULT_PORT: u16 = 5000;
}

/// Session management
pub mod session {
    /// Session cookie name
    pub const COOKIE_NAME: &str = "agriai_sid";

    /// Default session lifetime (hours): one week
    pub const DEFAULT_TTL_HOURS: u64 = 24 * 7;

    /// Random bytes per session token
    pub const TOKEN_BYTES: usize = 32;

    /// bcrypt work factor
    pub const BCRYPT_COST: u32 = 10;
}

/// Chat history
pub mod chat {
    /// Messages of history sent with each chat completion
    pub const DEFAULT_HISTORY_LIMIT: usize = 50;

    /// Messages returned by the history endpoint
    pub const HISTORY_PAGE_LIMIT: usize = 500;

    /// Reply used when the model returns no text
    pub const EMPTY_REPLY: &str = "Извините, не могу ответить на этот вопрос.";
}

/// Inventory records
pub mod inventory {
    /// Unit used when a record is created without one
    pub const DEFAULT_UNIT: &str = "кг";

    /// Decimal places kept by the rebalancer
    pub const QUANTITY_DECIMALS: usize = 2;
}
