//! Platform Capabilities Module
//!
//! Small interfaces over the ambient environment (clock, page reload, network)
//! so caching, polling and request interception run without a browser.

mod clock;
mod network;
mod reload;

pub use clock::{Clock, ManualClock, SystemClock};
pub use network::{HttpNetwork, Network};
pub use reload::{LogReloader, Reloader};
