#![forbid(unsafe_code)]

pub mod daily;
pub mod error;
pub mod goal;
pub mod model;
pub mod quiz;
pub mod ranking;
pub mod scoring;
pub mod shuffle;
pub mod time;
pub mod weekly;

pub use error::Error;
pub use time::Clock;
