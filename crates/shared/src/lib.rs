pub mod feed;
pub mod grid;
pub mod models;
pub mod render;
pub mod viewport;
