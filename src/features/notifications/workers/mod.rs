mod lead_watcher;

pub use lead_watcher::*;
