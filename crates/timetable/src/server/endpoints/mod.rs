pub mod catalog;
pub mod selection;
pub mod status;
