pub(crate) mod playhead;
pub(crate) mod scheduler;
pub(crate) mod session;
pub(crate) mod sync;
