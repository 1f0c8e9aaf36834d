mod annotation;
mod field;
mod method;
mod type_descriptor;

pub use annotation::*;
pub use field::*;
pub use method::*;
pub use type_descriptor::*;
