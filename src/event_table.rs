use std::{
    fmt,
    io::{self, Write},
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

/// Size of one serialized record: activation (2) + execution (2) + address (4).
pub const ENTRY_SIZE: usize = 8;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EventTableError {
    #[error("Event table entry {index} has type {activation_type}/{execution_type} but no address")]
    AddressRequired {
        index: usize,
        activation_type: u16,
        execution_type: u16,
    },
    #[error("Event table entry {index} has activation type 0, which reads back as the terminator")]
    MissingActivation { index: usize },
    #[error("Event table at {offset:#x} runs past the end of the buffer")]
    Truncated { offset: usize },
    #[error("Event table needs {needed} bytes at {offset:#x}, buffer has {available}")]
    BufferTooSmall {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// When a space's event runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ActivationType {
    WalkOver = 1,
    LandedOn = 2,
    BeginTurn = 3,
    EndTurn = 4,
    PerTurn = 5,
    BeforeDiceRoll = 6,
}

impl TryFrom<u16> for ActivationType {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ActivationType::WalkOver),
            2 => Ok(ActivationType::LandedOn),
            3 => Ok(ActivationType::BeginTurn),
            4 => Ok(ActivationType::EndTurn),
            5 => Ok(ActivationType::PerTurn),
            6 => Ok(ActivationType::BeforeDiceRoll),
            other => Err(other),
        }
    }
}

/// How a space's event runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString)]
pub enum ExecutionType {
    /// Called inline from the board loop.
    Direct = 1,
    /// Started as a separate process.
    Process = 2,
}

impl TryFrom<u16> for ExecutionType {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ExecutionType::Direct),
            2 => Ok(ExecutionType::Process),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventTableEntry {
    pub activation_type: u16,
    pub execution_type: u16,
    pub address: u32,
}

impl EventTableEntry {
    pub fn new(activation_type: u16, execution_type: u16, address: u32) -> Self {
        Self {
            activation_type,
            execution_type,
            address,
        }
    }

    fn is_typed(&self) -> bool {
        self.activation_type != 0 || self.execution_type != 0
    }
}

impl fmt::Display for EventTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let activation = ActivationType::try_from(self.activation_type)
            .map(|a| a.to_string())
            .unwrap_or_else(|raw| format!("Activation({})", raw));
        let execution = ExecutionType::try_from(self.execution_type)
            .map(|e| e.to_string())
            .unwrap_or_else(|raw| format!("Execution({})", raw));
        write!(f, "{:<16} {:<12} {:#010x}", activation, execution, self.address)
    }
}

/// The null-terminated list of events attached to one board space.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventTable {
    pub entries: Vec<EventTableEntry>,
}

impl EventTable {
    pub fn new(entries: Vec<EventTableEntry>) -> Self {
        Self { entries }
    }

    /// Bytes needed to store `entries` records plus the terminator.
    pub fn byte_length(entries: usize) -> usize {
        entries * ENTRY_SIZE + ENTRY_SIZE
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read records from `offset` until one with a zero activation type.
    #[tracing::instrument(skip(buffer))]
    pub fn parse(buffer: &[u8], offset: usize) -> Result<EventTable, EventTableError> {
        let mut entries = vec![];
        let mut position = offset;

        loop {
            let record = buffer
                .get(position..position + ENTRY_SIZE)
                .ok_or(EventTableError::Truncated { offset })?;
            let (activation_type, execution_type, address) =
                read_entry(record).map_err(|_| EventTableError::Truncated { offset })?;

            if activation_type == 0 {
                break;
            }
            entries.push(EventTableEntry::new(
                activation_type,
                execution_type,
                address,
            ));
            position += ENTRY_SIZE;
        }

        Ok(EventTable { entries })
    }

    /// Check every record before anything is written.
    pub fn validate(&self) -> Result<(), EventTableError> {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.activation_type == 0 {
                return Err(EventTableError::MissingActivation { index });
            }
            if entry.is_typed() && entry.address == 0 {
                return Err(EventTableError::AddressRequired {
                    index,
                    activation_type: entry.activation_type,
                    execution_type: entry.execution_type,
                });
            }
        }
        Ok(())
    }

    /// Serialize the records followed by a zero terminator.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EventTableError> {
        let mut bytes = vec![0; Self::byte_length(self.len())];
        self.write(&mut bytes, 0)?;
        Ok(bytes)
    }

    /// Write the table into `buffer` at `offset` and return the number of bytes written.
    ///
    /// Nothing is written unless every record is valid and the whole table fits.
    #[tracing::instrument(skip(self, buffer), fields(entries = self.len()))]
    pub fn write(&self, buffer: &mut [u8], offset: usize) -> Result<usize, EventTableError> {
        self.validate()?;

        let needed = Self::byte_length(self.len());
        let too_small = EventTableError::BufferTooSmall {
            offset,
            needed,
            available: buffer.len().saturating_sub(offset),
        };
        let mut destination = match buffer.get_mut(offset..offset + needed) {
            Some(destination) => destination,
            None => return Err(too_small),
        };

        let terminator = EventTableEntry::default();
        for entry in self.entries.iter().chain(std::iter::once(&terminator)) {
            if write_entry(&mut destination, entry).is_err() {
                return Err(too_small);
            }
        }

        Ok(needed)
    }
}

fn read_entry(mut record: &[u8]) -> io::Result<(u16, u16, u32)> {
    Ok((
        record.read_u16::<BigEndian>()?,
        record.read_u16::<BigEndian>()?,
        record.read_u32::<BigEndian>()?,
    ))
}

fn write_entry<W: Write>(writer: &mut W, entry: &EventTableEntry) -> io::Result<()> {
    writer.write_u16::<BigEndian>(entry.activation_type)?;
    writer.write_u16::<BigEndian>(entry.execution_type)?;
    writer.write_u32::<BigEndian>(entry.address)
}

impl fmt::Display for EventTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}
