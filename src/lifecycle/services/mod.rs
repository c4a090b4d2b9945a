//! Application services driving the server lifecycle.

mod monitor;
mod notifier;
mod probe;
mod render;
mod tasks;

pub use monitor::{
    LifecycleMonitor, MonitorError, MonitorHandle, MonitorSettings, MonitorStatus, StartRequester,
};
pub use probe::StatusProbe;
pub use render::{MessageRenderer, RenderError};
