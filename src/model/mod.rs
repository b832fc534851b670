pub mod document;
pub mod node;
pub mod value;

pub use document::*;
pub use node::*;
pub use value::*;
