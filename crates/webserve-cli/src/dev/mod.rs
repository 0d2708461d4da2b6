//! Development mode: the HTTP server, the live-reload registry, the signal
//! client used by build subprocesses and the source watcher.

pub mod registry;
pub mod server;
pub mod signal;
pub mod watcher;

pub use registry::{ClientHandle, ConnectionRegistry, RELOAD_MESSAGE, SharedRegistry};
pub use server::{DevServer, DevServerState, SIGNAL_ROUTE, SharedState, build_router};
pub use signal::send_reload_signal;
pub use watcher::{FileChange, FileWatcher, next_batch};
