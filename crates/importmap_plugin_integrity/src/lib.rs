pub use configuration::*;
pub use dynamic_import_map_plugin::*;
pub use error::*;
pub use hook_interceptor::*;
pub use injection_site::*;
pub use integrity_injector::*;
pub use integrity_map::*;

mod configuration;
mod dynamic_import_map_plugin;
mod entry_html;
mod error;
mod hook_interceptor;
mod injection_site;
mod integrity_injector;
mod integrity_map;
mod preload_chunk;

#[cfg(test)]
mod test_utils;
