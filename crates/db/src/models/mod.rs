pub mod document;
pub mod playlist;
