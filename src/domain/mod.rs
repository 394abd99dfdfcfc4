// Domain layer: records and ports. Pure data, no I/O.

pub mod hours;
pub mod model;
pub mod ports;
