pub(crate) mod core;
pub(crate) mod duration;
pub(crate) mod error;
