pub mod errors;
pub mod beer;
