pub mod latency;
pub mod routes;

pub use latency::LatencyStats;
