pub mod store;
pub mod task;

pub use store::TimelineStore;
pub use task::{Row, RowId, Task, TaskId, TaskPatch};
