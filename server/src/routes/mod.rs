pub mod api;
pub mod areas;
pub mod pages;
