pub mod arrival;
pub mod leave;
