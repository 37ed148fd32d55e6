//! Memory handling for the simulator.
//!
//! This module consists of:
//! - [`RegFile`]: The register file.
//! - [`Mem`]: The memory.

use crate::ast::{Reg, NUM_REGS};

/// The number of bytes in memory.
pub const MEM_SIZE: usize = 128;

/// The register file.
///
/// This holds 32 signed 64-bit registers, all of which start at 0.
/// It can be indexed by a [`Reg`]:
///
/// ```
/// use rv_lite::ast::Reg;
/// use rv_lite::sim::mem::RegFile;
///
/// let mut reg_file = RegFile::new();
/// reg_file[Reg::LINK] = 12;
/// assert_eq!(reg_file[Reg::LINK], 12);
/// assert_eq!(reg_file.as_slice()[31], 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegFile([i64; NUM_REGS]);
impl RegFile {
    /// Creates a register file with all registers set to 0.
    pub fn new() -> Self {
        Self([0; NUM_REGS])
    }

    /// Gets the registers as a slice, ordered by index.
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Gets an iterable of each register and its value.
    pub fn iter(&self) -> impl Iterator<Item=(Reg, i64)> + '_ {
        (0..).map(Reg).zip(self.0.iter().copied())
    }
}
impl Default for RegFile {
    fn default() -> Self {
        Self::new()
    }
}
impl std::ops::Index<Reg> for RegFile {
    type Output = i64;

    fn index(&self, index: Reg) -> &Self::Output {
        &self.0[usize::from(index)]
    }
}
impl std::ops::IndexMut<Reg> for RegFile {
    fn index_mut(&mut self, index: Reg) -> &mut Self::Output {
        &mut self.0[usize::from(index)]
    }
}

/// Memory.
///
/// This is a block of 128 bytes, addressed from 0 to 127, which starts zeroed.
/// No instruction reads or writes it,
/// so it only changes through direct access from the host.
///
/// ```
/// use rv_lite::sim::mem::Mem;
///
/// let mut mem = Mem::new();
/// mem[4] = 0xAB;
/// assert_eq!(mem.get(4), Some(0xAB));
/// assert_eq!(mem.get(128), None);
/// assert!(mem.to_hex().starts_with("00000000ab00"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mem {
    data: [u8; MEM_SIZE]
}
impl Mem {
    /// Creates a new zeroed memory.
    pub fn new() -> Self {
        Self { data: [0; MEM_SIZE] }
    }

    /// Gets the byte at the given address, if it is in range.
    pub fn get(&self, addr: usize) -> Option<u8> {
        self.data.get(addr).copied()
    }

    /// Gets the memory as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Gets the memory as a mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Renders the memory as a lowercase hex string, two digits per byte.
    pub fn to_hex(&self) -> String {
        use std::fmt::Write;

        self.data.iter()
            .fold(String::with_capacity(MEM_SIZE * 2), |mut out, b| {
                let _ = write!(out, "{b:02x}");
                out
            })
    }
}
impl Default for Mem {
    fn default() -> Self {
        Self::new()
    }
}
impl std::ops::Index<usize> for Mem {
    type Output = u8;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}
impl std::ops::IndexMut<usize> for Mem {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}
