//! Spatial index build/sort/reorder/offsets (§4.2). Entirely single-threaded;
//! runs between the external-forces pass and the density pass (§4.4 step 3).
//!
//! The teacher's `sfs_update_spatial_hash` only ever filled an unsorted
//! `spatial_indices` array and never actually sorted or reordered particles
//! (its own comment admits "I've not yet switched to using it" — the
//! neighbor-iteration code in `sim_sfs_impl.rs` walked a `spatial_keys` array
//! that was never kept in sync with a real sort). This module builds the
//! real thing: a genuine key sort followed by an in-place reorder of the
//! particle array, so `offsets[k]` truly locates a contiguous bucket.

use crate::particle::Particle;
use crate::spatial_hash::{cell_coord, hash_cell, key_from_hash, OFFSETS_3D};

/// Compute `keys[i]` for every particle from its predicted position.
pub fn compute_keys(particles: &[Particle], smoothing_radius: f32, keys: &mut [u32]) {
    let n = particles.len() as u32;
    for (key, particle) in keys.iter_mut().zip(particles) {
        let cell = cell_coord(particle.predicted, smoothing_radius);
        *key = key_from_hash(hash_cell(cell), n);
    }
}

/// Produce a permutation `sorted_indices` such that
/// `keys[sorted_indices[a]] <= keys[sorted_indices[b]]` for `a < b`. Any
/// stable or unstable sort is acceptable (§4.2); an unstable sort avoids an
/// allocation-heavy comparator path.
pub fn sort_indices(keys: &[u32], sorted_indices: &mut [u32]) {
    for (i, slot) in sorted_indices.iter_mut().enumerate() {
        *slot = i as u32;
    }
    sorted_indices.sort_unstable_by_key(|&i| keys[i as usize]);
}

/// Rearrange `particles` and `keys` into the cell-sorted layout described by
/// `sorted_indices`, via a scratch buffer and move-back (the canonical
/// approach per §4.2).
pub fn reorder(
    particles: &mut [Particle],
    keys: &mut [u32],
    sorted_indices: &[u32],
    scratch_particles: &mut Vec<Particle>,
    scratch_keys: &mut Vec<u32>,
) {
    scratch_particles.clear();
    scratch_keys.clear();
    scratch_particles.extend(sorted_indices.iter().map(|&i| particles[i as usize]));
    scratch_keys.extend(sorted_indices.iter().map(|&i| keys[i as usize]));
    particles.copy_from_slice(scratch_particles);
    keys.copy_from_slice(scratch_keys);
}

/// `offsets[k] = N` for every empty bucket, else the smallest index `i` with
/// `keys[i] == k`.
pub fn compute_offsets(keys: &[u32], offsets: &mut [u32]) {
    let n = keys.len() as u32;
    offsets.fill(n);
    for (i, &key) in keys.iter().enumerate() {
        let slot = &mut offsets[key as usize];
        *slot = (*slot).min(i as u32);
    }
}

/// Walk every candidate particle index across the 27-cell neighborhood of
/// `origin_cell` (§4.2). Visits hash-collision false positives too; the
/// caller is responsible for the `d ≤ h` (or `d² ≤ h²`) distance test.
///
/// Corrected relative to the ported source's off-by-one (§9): each bucket
/// entry is dereferenced *before* the cursor advances, and the walk stops
/// strictly on the first key mismatch rather than after incrementing past it.
pub fn for_each_candidate(
    keys: &[u32],
    offsets: &[u32],
    origin_cell: (i32, i32, i32),
    n: u32,
    mut visit: impl FnMut(usize),
) {
    for (dx, dy, dz) in OFFSETS_3D {
        let cell = (origin_cell.0 + dx, origin_cell.1 + dy, origin_cell.2 + dz);
        let key = key_from_hash(hash_cell(cell), n);
        let mut curr = offsets[key as usize];
        while curr < n {
            if keys[curr as usize] != key {
                break;
            }
            visit(curr as usize);
            curr += 1;
        }
    }
}
