pub mod course;
pub mod level;
pub mod motion;
pub mod player;
pub mod store;
pub mod world;
