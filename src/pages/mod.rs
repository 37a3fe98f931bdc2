pub mod editor;
pub mod login;
pub mod not_found;
