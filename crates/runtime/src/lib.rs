pub mod cursor;
pub mod frame;
pub mod window;

pub use cursor::*;
pub use frame::*;
pub use window::*;
