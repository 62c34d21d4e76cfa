//! Magic-tag scanning over a flat byte buffer.

use std::ops::Range;

/// Magic bytes at the start of every device tree blob.
pub const FDT_MAGIC: [u8; 4] = [0xD0, 0x0D, 0xFE, 0xED];

/// Offset of the big-endian total-size field, relative to the magic.
pub const SIZE_FIELD_OFFSET: usize = 4;

/// Locate every fragment in `data`.
///
/// Each range starts at a magic tag and ends where the next fragment starts,
/// or at the end of the buffer for the last one. Bytes before the first magic
/// tag belong to no fragment.
pub fn fragment_ranges(data: &[u8]) -> Vec<Range<usize>> {
    let mut starts = Vec::new();
    let mut cursor = 0usize;

    while cursor + FDT_MAGIC.len() <= data.len() {
        if data[cursor..cursor + FDT_MAGIC.len()] != FDT_MAGIC {
            cursor += 1;
            continue;
        }

        starts.push(cursor);
        let size = read_size(data, cursor).unwrap_or(0);
        if size == 0 {
            tracing::warn!(offset = cursor, "Blob fragment declares zero size");
        }
        // Always move forward, even on a corrupt size field.
        cursor = cursor.saturating_add(size.max(1));
    }

    if let Some(&first) = starts.first()
        && first > 0
    {
        tracing::debug!(skipped = first, "Ignoring bytes before the first blob fragment");
    }

    starts
        .iter()
        .enumerate()
        .map(|(index, &start)| {
            let end = starts.get(index + 1).copied().unwrap_or(data.len());
            start..end
        })
        .collect()
}

/// Split `data` into owned fragments.
///
/// Returns an empty list when no magic tag is present, which callers treat as
/// "no profile data". Bytes before the first magic tag are dropped, so
/// `merge(split(data)) == data` only holds when `data` starts with a
/// fragment.
pub fn split(data: &[u8]) -> Vec<Vec<u8>> {
    let fragments: Vec<Vec<u8>> = fragment_ranges(data)
        .into_iter()
        .map(|range| data[range].to_vec())
        .collect();
    tracing::debug!(count = fragments.len(), "Split blob into fragments");
    fragments
}

/// Concatenate fragments in order, with no padding between them.
pub fn merge<T: AsRef<[u8]>>(fragments: &[T]) -> Vec<u8> {
    let total = fragments.iter().map(|f| f.as_ref().len()).sum();
    let mut output = Vec::with_capacity(total);
    for fragment in fragments {
        output.extend_from_slice(fragment.as_ref());
    }
    output
}

fn read_size(data: &[u8], magic_offset: usize) -> Option<usize> {
    let start = magic_offset + SIZE_FIELD_OFFSET;
    let bytes: [u8; 4] = data.get(start..start + 4)?.try_into().ok()?;
    usize::try_from(u32::from_be_bytes(bytes)).ok()
}
