pub mod scheduler;
pub mod text;
pub mod time;
