pub mod alu;
pub mod memmap;
pub mod mode;
pub mod op;
pub mod program;
pub mod reg;
