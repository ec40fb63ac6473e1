pub mod combine;
pub mod generate;
pub mod size;
