//! Flattened device tree header.

use crate::error::{BlobError, Result};
use crate::split::FDT_MAGIC;

/// Size of the version 17 FDT header in bytes.
pub const FDT_HEADER_LEN: usize = 40;

/// Header fields of one device tree blob. All fields are big-endian on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdtHeader {
    pub total_size: u32,
    pub off_dt_struct: u32,
    pub off_dt_strings: u32,
    pub off_mem_rsvmap: u32,
    pub version: u32,
    pub last_comp_version: u32,
    pub boot_cpuid_phys: u32,
    pub size_dt_strings: u32,
    pub size_dt_struct: u32,
}

impl FdtHeader {
    /// Parse the header at the start of `fragment`.
    pub fn parse(fragment: &[u8]) -> Result<Self> {
        if fragment.len() < FDT_HEADER_LEN {
            return Err(BlobError::Truncated {
                len: fragment.len(),
                required: FDT_HEADER_LEN,
            });
        }
        if fragment[0..4] != FDT_MAGIC {
            return Err(BlobError::InvalidMagic {
                found: fragment[0..4].to_vec(),
            });
        }

        let word = |index: usize| {
            let at = index * 4;
            u32::from_be_bytes([
                fragment[at],
                fragment[at + 1],
                fragment[at + 2],
                fragment[at + 3],
            ])
        };

        Ok(Self {
            total_size: word(1),
            off_dt_struct: word(2),
            off_dt_strings: word(3),
            off_mem_rsvmap: word(4),
            version: word(5),
            last_comp_version: word(6),
            boot_cpuid_phys: word(7),
            size_dt_strings: word(8),
            size_dt_struct: word(9),
        })
    }

    /// Whether the declared size matches the fragment length found by the splitter.
    pub fn size_matches(&self, fragment_len: usize) -> bool {
        usize::try_from(self.total_size).is_ok_and(|size| size == fragment_len)
    }
}
