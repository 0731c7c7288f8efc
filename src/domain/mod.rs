// Domain layer: core models, chart plans and ports. No I/O here.

pub mod model;
pub mod plan;
pub mod ports;
