pub mod common;
mod estimate;

pub use estimate::{
    EstimateCalculator, EstimateLineItem, EstimateTotals, PricingError, OVERHEAD_MARKUP,
    base_rate, line_total,
};
