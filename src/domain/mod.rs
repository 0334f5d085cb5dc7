pub mod moves;
pub mod track;
pub mod user;
