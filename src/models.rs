pub mod analysis;
pub mod pdfs;
pub mod profiles;
pub mod wordbook;
