use thiserror::Error;

use crate::memmap::MEMORY_SIZE;
use crate::op::Opcode;

/// Interrupt vectors available after the entry slot.
pub const INTERRUPT_VECTORS: usize = 3;
/// Every slot holds one `jump` (opcode + 16-bit target).
pub const VECTOR_SLOT_SIZE: usize = 3;
pub const VECTOR_TABLE_SIZE: usize = (1 + INTERRUPT_VECTORS) * VECTOR_SLOT_SIZE;

/// Label that slot 0 of the vector table jumps to.
pub const ENTRY_LABEL: &str = "__start";

/// Address of the vector slot serving interrupt `n`.
pub fn vector_slot(n: usize) -> u16 {
    ((n + 1) * VECTOR_SLOT_SIZE) as u16
}

// ----------------------------------------------------------------------------
// Header

pub const MAGIC: &[u8; 6] = b"PENPAL";
pub const VERSION_MAJOR: u8 = 0;
pub const VERSION_MINOR: u8 = 1;
pub const HEADER_SIZE: usize = MAGIC.len() + 2 + 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("Truncated header: {0} bytes")]
    TruncatedHeader(usize),

    #[error("Unsupported program version {0}.{1}")]
    UnsupportedVersion(u8, u8),

    #[error("Program does not fit in memory: {0} bytes")]
    TooLarge(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub major: u8,
    pub minor: u8,
    pub entry: u16,
}

impl Header {
    pub fn new(entry: u16) -> Self {
        Header {
            major: VERSION_MAJOR,
            minor: VERSION_MINOR,
            entry,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0; HEADER_SIZE];
        bytes[..MAGIC.len()].copy_from_slice(MAGIC);
        bytes[6] = self.major;
        bytes[7] = self.minor;
        bytes[8..].copy_from_slice(&self.entry.to_be_bytes());
        bytes
    }

    /// `None` when `bytes` does not start with the magic.
    pub fn parse(bytes: &[u8]) -> Option<Result<Self, ProgramError>> {
        if !bytes.starts_with(MAGIC) {
            return None;
        }
        if bytes.len() < HEADER_SIZE {
            return Some(Err(ProgramError::TruncatedHeader(bytes.len())));
        }
        let (major, minor) = (bytes[6], bytes[7]);
        if major != VERSION_MAJOR {
            return Some(Err(ProgramError::UnsupportedVersion(major, minor)));
        }
        Some(Ok(Header {
            major,
            minor,
            entry: u16::from_be_bytes([bytes[8], bytes[9]]),
        }))
    }
}

// ----------------------------------------------------------------------------
// Program

/// Memory image loaded at address 0, plus the address execution starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub entry: u16,
    pub image: Vec<u8>,
}

impl Program {
    pub fn new(entry: u16, image: Vec<u8>) -> Self {
        Program { entry, image }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, ProgramError> {
        let (entry, image) = match Header::parse(bytes) {
            Some(header) => (header?.entry, &bytes[HEADER_SIZE..]),
            None => (0, bytes),
        };
        if image.len() > MEMORY_SIZE {
            return Err(ProgramError::TooLarge(image.len()));
        }
        Ok(Program::new(entry, image.to_vec()))
    }

    /// Whether the image opens with a vector table: execution starts at 0,
    /// where a `jump` leads past the table.
    pub fn has_vectors(&self) -> bool {
        match self.image.get(..VECTOR_SLOT_SIZE) {
            Some(&[op, hi, lo]) => {
                self.entry == 0
                    && op == u8::from(Opcode::Jump)
                    && u16::from_be_bytes([hi, lo]) as usize >= VECTOR_TABLE_SIZE
            }
            _ => false,
        }
    }

    pub fn to_bytes(&self, header: bool) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + self.image.len());
        if header {
            bytes.extend_from_slice(&Header::new(self.entry).to_bytes());
        }
        bytes.extend_from_slice(&self.image);
        bytes
    }
}
