pub mod assets;
pub mod path;
pub mod response;
