pub mod alphabet;
pub mod calibration;
pub mod candidate;
pub mod config;
pub mod consts;
pub mod error;
pub mod pipeline;
pub mod prune;
pub mod scorer;
pub mod search;
pub mod stage;
// cmd and reports are binary modules (see main.rs).
