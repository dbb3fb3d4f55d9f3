//! Tesim: Traffic Engineering SIMulation
//!
//! Compute the link loads of a network where demands are routed with IGP shortest paths (ECMP),
//! segment-routing waypoints, or explicit paths, and optimize the IGP link weights to minimize
//! the maximum link utilization.

#![deny(missing_docs, missing_debug_implementations)]
#![allow(clippy::type_complexity)]

use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};

pub mod algorithms;
pub mod demands;
pub mod error;
pub mod paths;
pub mod scenario;
pub mod setting;
pub mod simulators;
pub mod solvers;
#[cfg(test)]
mod tests;

pub use error::Error;

pub(crate) const SPINNER_TEMPLATE: &str = "{msg:50} {elapsed:<3}     {spinner} ({pos} iter)";

pub(crate) fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

pub(crate) fn my_spinner(msg: impl Into<String>, keep: bool, show: bool) -> ProgressBar {
    if show {
        ProgressBar::new_spinner()
            .with_style(spinner_style())
            .with_finish(if keep {
                ProgressFinish::AndLeave
            } else {
                ProgressFinish::AndClear
            })
            .with_message(msg.into())
    } else {
        ProgressBar::hidden()
    }
}
