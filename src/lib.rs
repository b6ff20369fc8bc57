pub mod error;
pub mod bits;
pub mod alu;
pub mod step;
pub mod algorithm;
pub mod restoring;
pub mod non_restoring;
pub mod shift_add;
pub mod booth;
pub mod fast_booth;
pub mod summary;
pub mod metrics;
pub mod playback;
pub mod sweep;
pub mod operands;
