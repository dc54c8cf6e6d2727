pub mod assembler;
pub mod collector;
pub mod error;
pub mod platform;
pub mod probe;
pub mod ranker;
pub mod sampler;
pub mod sensor;
pub mod snapshot;
pub mod source;

use probe::Capabilities;
use source::{FallbackHost, HostSource};

/// Checks once whether sysinfo can probe this OS.
pub fn detect_capabilities() -> Capabilities {
    if sysinfo::IS_SUPPORTED_SYSTEM {
        Capabilities::full()
    } else {
        Capabilities::reduced()
    }
}

pub fn host_for(capabilities: Capabilities) -> Box<dyn HostSource> {
    if capabilities.full_probe {
        Box::new(collector::SysinfoHost::new())
    } else {
        Box::new(FallbackHost)
    }
}
