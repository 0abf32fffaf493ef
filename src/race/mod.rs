//! Ranking, keyframe interpolation and per-team transition lookups.

pub(crate) mod keyframes;
pub(crate) mod model;
pub(crate) mod prepared;
pub(crate) mod rank;
pub(crate) mod transition;
