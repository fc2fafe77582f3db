pub mod stage_architecture;
pub mod stage_extract_requirements;

pub use stage_architecture::*;
pub use stage_extract_requirements::*;
