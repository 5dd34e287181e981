// Domain layer: provisioning models and ports (interfaces to external systems).

pub mod model;
pub mod ports;
