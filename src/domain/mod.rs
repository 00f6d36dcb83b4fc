// Domain layer: coordinates, staged files, generation steps and the storage port.

pub mod model;
pub mod ports;
