pub mod advice;
pub mod upstream;
