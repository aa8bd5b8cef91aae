//! Rotation engines: cook assignment, reaction reconciliation, ratio
//! reporting and channel announcements.

pub mod announce;
pub mod assignment;
pub mod reaction;
pub mod report;
pub mod upcoming;
