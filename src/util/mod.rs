//! Small platform-facing helpers that sit outside the measured core.

pub mod affinity;
