//! Timeline control: the scrubber state machine and the scrubber-driven playback session.

pub(crate) mod scrubber;
pub(crate) mod session;
