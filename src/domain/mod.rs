pub mod forecast;
pub mod orders;
pub mod result;

pub use forecast::*;
pub use orders::*;
pub use result::*;
