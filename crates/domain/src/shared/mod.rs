pub mod entity;
pub mod patch;
