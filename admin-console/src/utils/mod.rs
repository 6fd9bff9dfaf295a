pub mod jwt;
pub mod supersede;
