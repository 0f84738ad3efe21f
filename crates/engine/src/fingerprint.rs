// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task content fingerprinting: the 128-bit digest that decides whether a
//! binding can be resumed from the cache.

use rflow_core::{ContextValue, Fingerprint, HashMode, InputDef};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::time::UNIX_EPOCH;

/// One declared input, paired with its definition so file inputs can be
/// canonicalized differently from scalar/each inputs.
pub struct DeclaredInput<'a> {
    pub def: &'a InputDef,
    pub value: &'a ContextValue,
}

/// Everything the fingerprint is computed over, already resolved for one
/// binding.
pub struct FingerprintInputs<'a> {
    pub session_unique_id: &'a str,
    pub processor_name: &'a str,
    pub source_text: &'a str,
    /// In declaration order.
    pub declared_inputs: &'a [DeclaredInput<'a>],
    /// Free variable `(name, value)` pairs referenced by the task body that
    /// are not declared inputs/outputs, in a caller-stable order (callers
    /// should sort by name so the same free-variable set always hashes the
    /// same way regardless of how it was collected).
    pub free_variables: &'a [(String, ContextValue)],
    pub hash_mode: HashMode,
}

/// Canonicalize a single staged file per the configured hash mode:
/// `standard` uses `(size, mtime, path)`, `deep` hashes the file's bytes.
fn canonicalize_file(path: &Path, mode: HashMode) -> std::io::Result<String> {
    let basename = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match mode {
        HashMode::Standard => {
            let meta = std::fs::metadata(path)?;
            let mtime = meta
                .modified()?
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            Ok(format!("{basename}:{}:{}:{}", meta.len(), mtime, path.display()))
        }
        HashMode::Deep => {
            let bytes = std::fs::read(path)?;
            let digest = Sha256::digest(&bytes);
            Ok(format!("{basename}:{digest:x}"))
        }
    }
}

/// Canonicalize a file-typed input's value as an order-invariant bag:
/// one `(basename, contentHash)` entry per staged path, sorted so that
/// permuting the input order never changes the fingerprint.
fn canonicalize_file_bag(value: &ContextValue, mode: HashMode) -> std::io::Result<String> {
    let mut entries: Vec<String> = value
        .file_paths()
        .into_iter()
        .map(|p| canonicalize_file(p, mode))
        .collect::<std::io::Result<_>>()?;
    entries.sort();
    Ok(entries.join(";"))
}

fn feed(hasher: &mut Sha256, field: &str) {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field.as_bytes());
}

/// Compute the content fingerprint of one task binding.
pub fn compute_fingerprint(inputs: &FingerprintInputs<'_>) -> std::io::Result<Fingerprint> {
    let mut hasher = Sha256::new();

    feed(&mut hasher, inputs.session_unique_id);
    feed(&mut hasher, inputs.processor_name);
    feed(&mut hasher, inputs.source_text);

    for input in inputs.declared_inputs {
        feed(&mut hasher, &input.def.name);
        let canonical = if input.def.is_file() {
            canonicalize_file_bag(input.value, inputs.hash_mode)?
        } else {
            input.value.canonical_text()
        };
        feed(&mut hasher, &canonical);
    }

    for (name, value) in inputs.free_variables {
        feed(&mut hasher, name);
        feed(&mut hasher, &value.canonical_text());
    }

    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Ok(Fingerprint::from_bytes(bytes))
}

/// Derive a collision-resolution rehash: combines the previous fingerprint
/// with the try count so repeated `workDir` collisions converge on a
/// distinct folder without touching the task's identity inputs.
pub fn rehash(previous: Fingerprint, tries: u32) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(previous.as_bytes());
    hasher.update(tries.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Fingerprint::from_bytes(bytes)
}

#[cfg(test)]
#[path = "fingerprint_tests.rs"]
mod tests;
