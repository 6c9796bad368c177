//! Parallel parser (C8).
//!
//! When the top-level value is an array at least
//! [`ParseConfig::parallel_threshold`] bytes long, its elements are
//! partitioned into contiguous spans along depth-1 commas and each span
//! is parsed on its own `rayon` task, reusing the exact same
//! recursive-descent engine as [`crate::parser`] (C7) — a worker's span
//! is just a slice of the full document's [`StructuralIndex`] with no
//! enclosing brackets. Falls back to the sequential driver for anything
//! else: a non-array top level, or input below the threshold.
//!
//! There is no work-stealing between spans once assigned (Core §7): each
//! worker's group of elements is fixed at partition time.

#[cfg(not(test))]
use alloc::vec;
#[cfg(not(test))]
use alloc::vec::Vec;

use rayon::prelude::*;

use crate::config::ParseConfig;
use crate::error::ParseError;
use crate::index::StructuralIndex;
use crate::parser::Cursor;
use crate::simd::StructuralKind;
use crate::value::Value;

/// `true` iff [`parse_parallel`] should be attempted for this input.
pub(crate) fn should_parallelize(bytes: &[u8], index: &StructuralIndex, config: &ParseConfig) -> bool {
    if bytes.len() < config.parallel_threshold {
        return false;
    }
    matches!(index.entries.first(), Some((_, StructuralKind::ArrayOpen)))
}

/// Entry indices (positions within `index.entries`, not byte offsets) of
/// the top-level array's opening bracket, every depth-1 comma inside it,
/// and its matching closing bracket, in document order. Assumes
/// `index.entries[0]` is that opening bracket (checked by
/// [`should_parallelize`] before this is called).
fn depth1_boundaries(index: &StructuralIndex) -> Vec<usize> {
    let mut boundaries = vec![0usize];
    let mut depth = 0i32;
    for (i, &(_, kind)) in index.entries.iter().enumerate() {
        match kind {
            StructuralKind::ArrayOpen | StructuralKind::ObjectOpen => depth += 1,
            StructuralKind::ArrayClose | StructuralKind::ObjectClose => {
                depth -= 1;
                if depth == 0 {
                    boundaries.push(i);
                    break;
                }
            }
            StructuralKind::Comma if depth == 1 => boundaries.push(i),
            _ => {}
        }
    }
    boundaries
}

/// Parses a top-level array with one `rayon` task per worker group.
/// `index` must already satisfy [`should_parallelize`].
pub(crate) fn parse_parallel(bytes: &[u8], index: &StructuralIndex, config: &ParseConfig) -> Result<Value, ParseError> {
    let boundaries = depth1_boundaries(index);
    let element_count = boundaries.len() - 1;

    if element_count == 1 && boundaries[0] + 1 == boundaries[1] {
        return Ok(Value::Array(Vec::new())); // `[]`
    }

    let worker_count = if config.worker_count > 0 { config.worker_count } else { rayon::current_num_threads() }
        .min(element_count)
        .max(1);

    let base = element_count / worker_count;
    let remainder = element_count % worker_count;
    let mut group_bounds = Vec::with_capacity(worker_count + 1);
    group_bounds.push(0usize);
    let mut acc = 0usize;
    for w in 0..worker_count {
        acc += base + if w < remainder { 1 } else { 0 };
        group_bounds.push(acc);
    }

    // (start_entry_idx, end_entry_idx, start_byte, end_byte) per worker,
    // all exclusive of the separators that bound the span.
    let spans: Vec<(usize, usize, usize, usize)> = (0..worker_count)
        .map(|w| {
            let first_elem = group_bounds[w];
            let last_elem = group_bounds[w + 1];
            let start_entry_idx = boundaries[first_elem] + 1;
            let end_entry_idx = boundaries[last_elem];
            let start_byte = index.entries[boundaries[first_elem]].0 as usize + 1;
            let end_byte = index.entries[boundaries[last_elem]].0 as usize;
            (start_entry_idx, end_entry_idx, start_byte, end_byte)
        })
        .collect();

    let results: Vec<Result<Vec<Value>, ParseError>> = spans
        .par_iter()
        .map(|&(start_entry_idx, end_entry_idx, start_byte, end_byte)| {
            let entries_slice = &index.entries[start_entry_idx..end_entry_idx];
            let mut cursor = Cursor::for_span(bytes, entries_slice, start_byte, config);
            cursor.parse_value_sequence(end_byte)
        })
        .collect();

    // Deterministic regardless of which worker finishes first: the
    // reported error is always the one closest to the start of the
    // document.
    if let Some(err) = results.iter().filter_map(|r| r.as_ref().err()).min_by_key(|e| e.position.offset) {
        return Err(err.clone());
    }

    let mut all = Vec::with_capacity(element_count);
    for r in results {
        all.extend(r.expect("checked for errors above"));
    }
    Ok(Value::Array(all))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index;

    #[test]
    fn parallel_matches_sequential_for_flat_array() {
        let input: Vec<u8> = {
            let mut s = alloc::string::String::from("[");
            for i in 0..500 {
                if i > 0 {
                    s.push(',');
                }
                s.push_str(&i.to_string());
            }
            s.push(']');
            s.into_bytes()
        };
        let cfg = ParseConfig::force_parallel(4);
        let parallel = crate::parser::parse_with(&input, &cfg).unwrap();
        let sequential = crate::parser::parse_with(&input, &ParseConfig::sequential_only()).unwrap();
        assert_eq!(parallel, sequential);
        assert_eq!(parallel.len(), 500);
    }

    #[test]
    fn empty_array_parallel() {
        let cfg = ParseConfig::force_parallel(4);
        let v = crate::parser::parse_with(b"[]", &cfg).unwrap();
        assert_eq!(v, Value::Array(Vec::new()));
    }

    #[test]
    fn single_element_array_parallel() {
        let cfg = ParseConfig::force_parallel(4);
        let v = crate::parser::parse_with(b"[42]", &cfg).unwrap();
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn non_array_top_level_never_qualifies() {
        let obj_index = index::build(br#"{"a":1}"#).unwrap();
        let cfg = ParseConfig::force_parallel(4);
        assert!(!should_parallelize(br#"{"a":1}"#, &obj_index, &cfg));
    }

    #[test]
    fn error_inside_one_span_is_reported_with_correct_position() {
        let input = b"[1,2,bogus,4]";
        let cfg = ParseConfig::force_parallel(2);
        let err = crate::parser::parse_with(input, &cfg).unwrap_err();
        assert_eq!(err.position.offset, 5);
    }

    #[test]
    fn nested_containers_do_not_confuse_partitioning() {
        let input = b"[[1,2],{\"a\":[3,4]},5]";
        let cfg = ParseConfig::force_parallel(3);
        let v = crate::parser::parse_with(input, &cfg).unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v.get(0).len(), 2);
        assert_eq!(v.get(2).as_f64(), 5.0);
    }
}
