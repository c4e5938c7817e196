pub mod monitor;

pub use monitor::{load_from, resolve_path, MonitorConfig};
