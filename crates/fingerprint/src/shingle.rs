//! Tag-path shingling.
//!
//! A subtree's structural vocabulary is the set of length-`window` contiguous
//! slices of its root-to-leaf tag paths, each hashed to a u64. The resulting
//! set feeds MinHash; its Jaccard similarity between two subtrees is the
//! similarity the whole pipeline estimates.

use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Hash every length-`window` slice of every path into a sorted, deduplicated
/// shingle set. Paths shorter than the window contribute nothing.
pub fn shingle_set(paths: &[Vec<String>], window: usize, seed: u64) -> Vec<u64> {
    if window == 0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut buf = String::new();
    for path in paths {
        if path.len() < window {
            continue;
        }
        for slice in path.windows(window) {
            buf.clear();
            for (i, tag) in slice.iter().enumerate() {
                if i > 0 {
                    buf.push('>');
                }
                buf.push_str(tag);
            }
            out.push(xxh3_64_with_seed(buf.as_bytes(), seed));
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}
