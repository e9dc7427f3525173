//! Lifecycle management core of the mydbs sample client: the generic
//! convergence poller, the per-kind tracking managers and the
//! shutdown-time reconciler that cleans up whatever a session leaves
//! behind.

pub mod backup;
pub mod db_instance;
pub mod lifecycle;
pub mod shutdown;
