pub mod error;
pub mod ssi_holder;
