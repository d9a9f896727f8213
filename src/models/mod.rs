// Response models

mod container;

pub use container::{ContainerReport, StatsResponse};
