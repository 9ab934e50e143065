pub mod dates;
pub mod geometry;
pub mod gesture;
pub mod graph;
pub mod validate;
pub mod view;

pub use gesture::GestureController;
pub use view::ViewState;
