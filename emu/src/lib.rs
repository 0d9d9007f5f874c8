pub mod fault;
pub mod hooks;
pub mod model;

pub use fault::Fault;
pub use model::{Step, Vm};
