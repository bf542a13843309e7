/// Column-name and display constants for the expenditure explorer.
/// Single source of truth - shared by loading, render specs and the Python frames.

// ── Source table columns ────────────────────────────────────────────────────
pub mod source {
    pub const ENTITY: &str = "Country Name";
}

// ── Long-form observation columns ───────────────────────────────────────────
pub mod observation {
    pub const ENTITY: &str = "entity";
    pub const YEAR: &str = "year";
    pub const VALUE: &str = "value";
    pub const SUM: &str = "value_sum";
    pub const COUNT: &str = "value_count";
}

// ── Supported year range ────────────────────────────────────────────────────
pub mod years {
    pub const MIN: i32 = 1960;
    pub const MAX: i32 = 2018;
    pub const MARK_STEP: i32 = 5;
    /// Widest range a config may ask for, in years.
    pub const MAX_SPAN: i64 = 1000;
}

// ── Map render constants ────────────────────────────────────────────────────
pub mod map {
    pub const ENTITY: &str = "Country Name";
    pub const VALUE: &str = "value";
    pub const TITLE_PREFIX: &str = "Year: ";
    pub const LOCATION_MODE: &str = "country names";
    pub const COLOR_SCHEME: &str = "Inferno";
    pub const COLOR_RANGE: [f64; 2] = [0.0, 20.0];
}

// ── Line render constants ───────────────────────────────────────────────────
pub mod line {
    pub const YEAR: &str = "Year";
}

/// Axis / colorbar label of the metric.
pub const VALUE_LABEL: &str = "Percentage";

/// Entity name of the pre-aggregated world rollup row in the source data.
pub const WORLD_ENTITY: &str = "World";
