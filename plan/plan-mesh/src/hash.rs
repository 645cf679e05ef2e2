//! Content hashing of meshing inputs.

use plan_types::WallSegment;

/// FNV-1a 64-bit. A fixed, process-independent algorithm: the hash is the
/// cache and publish-gate key for a segment's derived mesh, so it must not
/// depend on hasher state the way the std/hashbrown hashers do. It never
/// travels on the wire.
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

struct Fnv1a(u64);

impl Fnv1a {
    fn new() -> Self {
        Self(FNV_OFFSET)
    }

    fn write_u64(&mut self, value: u64) {
        for byte in value.to_le_bytes() {
            self.0 ^= u64::from(byte);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }

    fn write_f64(&mut self, value: f64) {
        self.write_u64(value.to_bits());
    }
}

/// Hash of everything that feeds a segment's mesh: endpoints, thickness,
/// height range, skirting profile, and the active (non-orphaned) opening
/// rectangles.
///
/// Two segments with identical inputs hash identically; any input change
/// changes the hash with overwhelming probability. Used to key the mesh
/// cache and to discard stale in-flight patches at publish time.
#[must_use]
pub fn segment_content_hash(segment: &WallSegment) -> u64 {
    let mut hasher = Fnv1a::new();
    hasher.write_f64(segment.start.x);
    hasher.write_f64(segment.start.y);
    hasher.write_f64(segment.end.x);
    hasher.write_f64(segment.end.y);
    hasher.write_f64(segment.thickness);
    hasher.write_f64(segment.base_z);
    hasher.write_f64(segment.height);
    match segment.skirting {
        Some(profile) => {
            hasher.write_u64(1);
            hasher.write_f64(profile.height);
            hasher.write_f64(profile.thickness);
        }
        None => hasher.write_u64(0),
    }
    for opening in segment.active_openings() {
        hasher.write_f64(opening.offset);
        hasher.write_f64(opening.sill);
        hasher.write_f64(opening.width);
        hasher.write_f64(opening.height);
    }
    hasher.0
}
