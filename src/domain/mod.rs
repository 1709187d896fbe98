// Domain layer: movie model and the ports (interfaces) the catalog depends on.

pub mod model;
pub mod ports;
