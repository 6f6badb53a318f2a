pub mod day;
pub mod form;
