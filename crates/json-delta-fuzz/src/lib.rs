//! Fuzzing harnesses for `json-delta-core`.
//!
//! Each `fuzz_*` function is called directly from a `libfuzzer-sys` target
//! in the top-level `fuzz/` directory; keeping the harness logic here
//! (rather than in the fuzz targets themselves) lets it also run under
//! `cargo test` without a nightly toolchain or `cargo fuzz`.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use arbitrary::{Arbitrary, Result, Unstructured};
use json_delta_core::policy::Policy;
use json_delta_core::textdiff::TextDiffConfig;
use json_delta_core::{apply_diff, diff, transform, Operation};
use serde_json::Value;

const MAX_DEPTH: u8 = 4;
const MAX_FANOUT: usize = 4;

/// Builds an arbitrary bounded-depth JSON value from fuzzer input.
///
/// Unbounded recursion is the classic way an `Arbitrary` impl for a
/// tree-shaped value turns a fuzzer's byte budget into a stack overflow;
/// `depth` counts down and forces a leaf once it hits zero.
fn arbitrary_value(u: &mut Unstructured<'_>, depth: u8) -> Result<Value> {
    if depth == 0 {
        return arbitrary_leaf(u);
    }
    let choice: u8 = u.int_in_range(0..=5)?;
    match choice {
        0..=2 => arbitrary_leaf(u),
        3 => {
            let len = u.int_in_range(0..=MAX_FANOUT)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(arbitrary_value(u, depth - 1)?);
            }
            Ok(Value::Array(items))
        }
        _ => {
            let len = u.int_in_range(0..=MAX_FANOUT)?;
            let mut map = serde_json::Map::with_capacity(len);
            for i in 0..len {
                let key = format!("k{i}");
                map.insert(key, arbitrary_value(u, depth - 1)?);
            }
            Ok(Value::Object(map))
        }
    }
}

fn arbitrary_leaf(u: &mut Unstructured<'_>) -> Result<Value> {
    let choice: u8 = u.int_in_range(0..=4)?;
    let value = match choice {
        0 => Value::Null,
        1 => Value::Bool(bool::arbitrary(u)?),
        2 => {
            let n: i32 = i32::arbitrary(u)?;
            Value::from(n)
        }
        3 => {
            let len = u.int_in_range(0..=12)?;
            let s: String = (0..len)
                .map(|_| {
                    let c: u8 = u.int_in_range(65..=122).unwrap_or(97);
                    c as char
                })
                .collect();
            Value::String(s)
        }
        _ => Value::String(String::new()),
    };
    Ok(value)
}

fn two_values(data: &[u8]) -> Result<(Value, Value)> {
    let mut u = Unstructured::new(data);
    let a = arbitrary_value(&mut u, MAX_DEPTH)?;
    let b = arbitrary_value(&mut u, MAX_DEPTH)?;
    Ok((a, b))
}

/// `diff(a, b)` then `apply_diff(a, diff)` must reproduce `b` exactly, or
/// report `None` only when `a == b` structurally.
pub fn fuzz_diff_patch_roundtrip(data: &[u8]) {
    let Ok((a, b)) = two_values(data) else { return };
    let cfg = TextDiffConfig::default();
    let policy = Policy::new();

    match diff(&a, &b, &policy, &cfg) {
        None => assert_eq!(a, b, "diff reported no change for unequal values"),
        Some(op) => {
            let patched = apply_diff(&a, &op, &cfg).expect("a diff produced from a and b must apply cleanly to a");
            assert_eq!(patched, b, "patching a with diff(a, b) did not reproduce b");
        }
    }
}

/// `apply_diff` must never panic on an arbitrary (value, operation) pair —
/// it should either succeed or return a typed [`json_delta_core::DeltaError`].
pub fn fuzz_patch_apply(data: &[u8]) {
    let mut u = Unstructured::new(data);
    let Ok(value) = arbitrary_value(&mut u, MAX_DEPTH) else { return };
    let Ok(op) = arbitrary_operation(&mut u) else { return };
    let cfg = TextDiffConfig::default();
    let _ = apply_diff(&value, &op, &cfg);
}

/// Transforming two diffs computed from the same base must never panic,
/// and applying the rebased local operation after the remote one must
/// never produce a typed error (only a structural mismatch would be a
/// bug worth reporting, since transform is allowed to make conflict
/// resolution choices fuzzing doesn't predict).
pub fn fuzz_transform_after_remote(data: &[u8]) {
    let mut u = Unstructured::new(data);
    let Ok(base) = arbitrary_value(&mut u, MAX_DEPTH) else { return };
    let Ok(local_target) = arbitrary_value(&mut u, MAX_DEPTH) else { return };
    let Ok(remote_target) = arbitrary_value(&mut u, MAX_DEPTH) else { return };
    let cfg = TextDiffConfig::default();
    let policy = Policy::new();

    let (Some(local_op), Some(remote_op)) =
        (diff(&base, &local_target, &policy, &cfg), diff(&base, &remote_target, &policy, &cfg))
    else {
        return;
    };

    let rebased = transform(Some(&base), &local_op, &remote_op, &cfg);
    let Ok(after_remote) = apply_diff(&base, &remote_op, &cfg) else { return };
    if let Some(rebased) = rebased {
        let _ = apply_diff(&after_remote, &rebased, &cfg);
    }
}

/// Decoding an arbitrary string as a TEXTDIFF delta must never panic —
/// either it parses or it is rejected as malformed.
pub fn fuzz_delta_decode(data: &[u8]) {
    let Ok(text) = std::str::from_utf8(data) else { return };
    let _ = json_delta_core::textdiff::from_delta(text);
}

fn arbitrary_operation(u: &mut Unstructured<'_>) -> Result<Operation> {
    let choice: u8 = u.int_in_range(0..=4)?;
    let op = match choice {
        0 => Operation::Insert(arbitrary_leaf(u)?),
        1 => Operation::Delete,
        2 => Operation::Replace(arbitrary_leaf(u)?),
        3 => {
            let d: f32 = f32::arbitrary(u)?;
            Operation::IntegerDelta(f64::from(d))
        }
        _ => {
            let len = u.int_in_range(0..=8)?;
            let s: String =
                (0..len).map(|_| u.int_in_range(97..=122_u8).unwrap_or(97) as char).collect();
            Operation::TextDelta(s)
        }
    };
    Ok(op)
}
