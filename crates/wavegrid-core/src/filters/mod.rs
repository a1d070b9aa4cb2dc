pub mod median;

pub use median::median_filter;
