pub mod bundle;
pub mod diagnostic;
pub mod hash;
pub mod macros;
pub mod plugin;
pub mod plugin_container;
