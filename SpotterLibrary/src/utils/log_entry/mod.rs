pub mod input;
pub mod io;
pub mod oracle;
pub mod render;
pub mod system;
