//! Running metrics for group-robust training
//!
//! - `average`: running weighted mean of a scalar stream
//! - `group`: group index codec and per-group accuracy aggregation

mod average;
mod group;

pub use average::AverageMeter;
pub use group::{decode_group, encode_group, update_group_meters, GroupResults};
