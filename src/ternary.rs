//! Compressed ternary polynomial pack/expand/convert (spec.md §3's
//! "Ternary polynomial (compressed)" data type). Distinct from
//! [`crate::sampling`]'s ternary samplers: these operations work on a
//! ternary polynomial regardless of where it came from — freshly sampled,
//! or a secret key loaded compressed from the table oracle (spec.md §6
//! `sk(n)`).

use crate::types::{Modulus, Ternary, Zz};

/// Expands a 2-bit-per-coefficient compressed ternary polynomial against
/// `modulus` into `out` (one `Zz` per coefficient, the `{0 -> q-1, 1 -> 0,
/// 2 -> 1}` storage code).
pub(crate) fn expand(compressed: &[u8], modulus: &Modulus, out: &mut [Zz]) {
    let n = out.len();
    debug_assert_eq!(compressed.len(), n / 4);
    for (i, slot) in out.iter_mut().enumerate() {
        let byte = compressed[i / 4];
        let code = (byte >> ((i % 4) * 2)) & 0b11;
        *slot = Ternary::from_pack_code(code).expand_mod(modulus.value());
    }
}

/// Packs an unpacked, already-expanded ternary polynomial (values in
/// `{0, 1, old_q - 1}`) back into its 2-bit compressed form.
pub(crate) fn compress(expanded: &[Zz], old_q: Zz, out: &mut [u8]) {
    let n = expanded.len();
    debug_assert_eq!(out.len(), n / 4);
    out.fill(0);
    for (i, &v) in expanded.iter().enumerate() {
        let code = decode_expanded(v, old_q).pack_code();
        out[i / 4] |= code << ((i % 4) * 2);
    }
}

/// Re-reduces an already-expanded ternary buffer (values in
/// `{0, 1, old_q - 1}`) against a new modulus, in place — used when the
/// encryptor's prime cursor advances and a persistently-expanded secret
/// key or `u` must follow it (spec.md §4.7/§4.8).
pub(crate) fn convert_in_place(buf: &mut [Zz], old_q: Zz, new_modulus: &Modulus) {
    for v in buf.iter_mut() {
        let t = decode_expanded(*v, old_q);
        *v = t.expand_mod(new_modulus.value());
    }
}

fn decode_expanded(v: Zz, old_q: Zz) -> Ternary {
    match v {
        0 => Ternary::Zero,
        1 => Ternary::One,
        x if x == old_q - 1 => Ternary::NegOne,
        _ => {
            debug_assert!(false, "ternary value not in {{0, 1, q-1}} under old_q");
            Ternary::Zero
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{compress, convert_in_place, expand};
    use crate::sampling::sample_ternary_compressed;
    use crate::prng::Prng;
    use crate::types::Modulus;

    #[test]
    fn expand_compress_round_trip() {
        let n = 256;
        let modulus = Modulus::new(134_012_929);
        let mut prng = Prng::from_seed([11u8; 64]);
        let mut compressed = vec![0u8; n / 4];
        sample_ternary_compressed(&mut prng, &mut compressed, n);

        let mut expanded = vec![0u32; n];
        expand(&compressed, &modulus, &mut expanded);

        let mut recompressed = vec![0u8; n / 4];
        compress(&expanded, modulus.value(), &mut recompressed);
        assert_eq!(compressed, recompressed);
    }

    #[test]
    fn convert_in_place_preserves_sign_pattern() {
        let old_modulus = Modulus::new(134_012_929);
        let new_modulus = Modulus::new(1_072_496_641);
        let n = 64;
        let mut prng = Prng::from_seed([12u8; 64]);
        let mut compressed = vec![0u8; n / 4];
        sample_ternary_compressed(&mut prng, &mut compressed, n);

        let mut under_old = vec![0u32; n];
        expand(&compressed, &old_modulus, &mut under_old);

        let mut under_new = under_old.clone();
        convert_in_place(&mut under_new, old_modulus.value(), &new_modulus);

        let mut recompressed_old = vec![0u8; n / 4];
        compress(&under_old, old_modulus.value(), &mut recompressed_old);
        let mut recompressed_new = vec![0u8; n / 4];
        compress(&under_new, new_modulus.value(), &mut recompressed_new);
        assert_eq!(recompressed_old, recompressed_new);
    }
}
