mod appointment;
mod status;

pub mod dtos {
    pub use crate::appointment::dtos::*;
}

pub use crate::appointment::api::*;
pub use crate::status::api::*;
