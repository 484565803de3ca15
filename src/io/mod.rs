pub mod discover;
pub mod excel_read;
