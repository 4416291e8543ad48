pub mod group;
pub mod params;
pub mod plugin;
pub mod ports;
pub mod processor;
pub mod schema;
pub mod world;
