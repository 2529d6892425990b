//! Records extracted from an input document

use crate::image::{Chunk, ChunkType};

/// A chunk-producing record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Contiguous block of program or parameter memory
    Data {
        /// Start address
        address: u16,
        /// Memory contents
        bytes: Vec<u8>,
    },
    /// Named control parameter of a module instance
    Control {
        /// Module instance name (CellName)
        module: String,
        /// Parameter name
        parameter: String,
        /// Parameter address
        address: u16,
        /// Parameter length
        length: u16,
    },
}

impl Record {
    /// Data record
    pub fn data(address: u16, bytes: Vec<u8>) -> Self {
        Self::Data { address, bytes }
    }

    /// Control record
    pub fn control(
        module: impl Into<String>,
        parameter: impl Into<String>,
        address: u16,
        length: u16,
    ) -> Self {
        Self::Control {
            module: module.into(),
            parameter: parameter.into(),
            address,
            length,
        }
    }

    /// Type of chunk this record becomes
    pub fn kind(&self) -> ChunkType {
        match self {
            Self::Data { .. } => ChunkType::Data,
            Self::Control { .. } => ChunkType::Control,
        }
    }

    /// Convert into the chunk that carries it
    pub fn into_chunk(self) -> Chunk {
        match self {
            Self::Data { address, bytes } => Chunk::data(address, bytes),
            Self::Control {
                module,
                parameter,
                address,
                length,
            } => Chunk::control(&module, &parameter, address, length),
        }
    }
}
