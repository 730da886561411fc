pub mod imdb;
pub mod json_file;
pub mod memory;
pub mod netflix;
pub mod postgres;
