pub mod feed_status;
pub mod grid_overlay;
pub mod map_view;
