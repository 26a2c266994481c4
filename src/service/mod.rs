pub mod attendance;
pub mod directory;
