pub mod price_range;

pub use price_range::{PriceRange, RangePreset};
