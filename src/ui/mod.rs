pub mod detail_panel;
pub mod theme;
pub mod timeline_view;
pub mod toolbar;
