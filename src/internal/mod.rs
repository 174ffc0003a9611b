//! Internal building blocks (parsed object records) that power the public
//! handle and repository APIs.

pub mod object;
