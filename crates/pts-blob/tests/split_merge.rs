//! Property tests for the split/merge identity.

use proptest::prelude::*;

use pts_blob::{FDT_MAGIC, fragment_ranges, merge, split};

/// Build a well-formed fragment whose size field covers the whole body.
fn fragment(body: &[u8]) -> Vec<u8> {
    let size = (body.len() + 8) as u32;
    let mut bytes = FDT_MAGIC.to_vec();
    bytes.extend_from_slice(&size.to_be_bytes());
    bytes.extend_from_slice(body);
    bytes
}

proptest! {
    #[test]
    fn merge_of_split_is_identity(
        bodies in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..6)
    ) {
        let image = merge(&bodies.iter().map(|b| fragment(b)).collect::<Vec<_>>());

        let parts = split(&image);
        prop_assert_eq!(parts.len(), bodies.len());
        prop_assert_eq!(merge(&parts), image);
    }

    #[test]
    fn split_never_hangs_on_garbage(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let ranges = fragment_ranges(&data);
        for window in ranges.windows(2) {
            prop_assert!(window[0].end == window[1].start);
        }
        if let Some(last) = ranges.last() {
            prop_assert_eq!(last.end, data.len());
        }
    }
}

#[test]
fn zero_length_field_yields_degenerate_fragment() {
    let mut image = FDT_MAGIC.to_vec();
    image.extend_from_slice(&0u32.to_be_bytes());

    let parts = split(&image);
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0], image);
}

#[test]
fn merge_of_split_starts_at_first_fragment() {
    let body = fragment(&[7, 7, 7]);
    let mut image = b"boot header".to_vec();
    image.extend_from_slice(&body);

    assert_eq!(merge(&split(&image)), body);
    assert!(merge(&split(b"no fragments at all")).is_empty());
}
