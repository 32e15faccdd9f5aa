// Domain layer: envelope payloads and the ports the bridges drive external tools through.

pub mod model;
pub mod ports;
