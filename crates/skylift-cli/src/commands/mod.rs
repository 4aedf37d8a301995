pub mod deploy;
pub mod extract;
pub mod render;
pub mod verify;
pub mod worker;
