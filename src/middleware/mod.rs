pub mod correlator;
pub mod openmetrics;
pub mod timing;
