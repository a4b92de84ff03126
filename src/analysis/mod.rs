pub mod economics;

pub use economics::full_analysis;
