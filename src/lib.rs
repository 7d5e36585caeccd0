#![no_std]
#![deny(clippy::pedantic, warnings, missing_docs, unsafe_code)]
// Most of the 'allow' category...
#![deny(absolute_paths_not_starting_with_crate, box_pointers, dead_code)]
#![deny(elided_lifetimes_in_paths, explicit_outlives_requirements, keyword_idents)]
#![deny(let_underscore_drop, macro_use_extern_crate, meta_variable_misuse, missing_abi)]
#![deny(non_ascii_idents, rust_2021_incompatible_closure_captures)]
#![deny(rust_2021_incompatible_or_patterns, rust_2021_prefixes_incompatible_syntax)]
#![deny(rust_2021_prelude_collisions, single_use_lifetimes, trivial_casts)]
#![deny(trivial_numeric_casts, unreachable_pub, unsafe_op_in_unsafe_fn, unstable_features)]
#![deny(unused_extern_crates, unused_import_braces, unused_lifetimes, unused_macro_rules)]
#![deny(unused_qualifications, unused_results, variant_size_differences)]
//
#![doc = include_str!("../README.md")]

// Implements FIPS 203 Module-Lattice-based Key-Encapsulation Mechanism Standard, ML-KEM-768.
// See <https://csrc.nist.gov/pubs/fips/203/final>

// TODO Roadmap
//   1. Expand test coverage against a real NIST/CCTV vector file once one is available locally.
//   2. Perf: optimize/minimize modular reductions, minimize u16 arith, consider avx2/aarch64
//      (currently, code is 'optimized' for safety and change-support, with reasonable perf)

// Functionality map per FIPS 203
//
// Algorithm 2 BitsToBytes(b)                               --> optimized out (byte_fns.rs)
// Algorithm 3 BytesToBits(B)                               --> optimized out (byte_fns.rs)
// Algorithm 4 ByteEncode_d(F)                              --> byte_fns.rs
// Algorithm 5 ByteDecode_d(B)                              --> byte_fns.rs
// Algorithm 6 SampleNTT(B)                                 --> sampling.rs
// Algorithm 7 SamplePolyCBDη(B)                            --> sampling.rs
// Algorithm 8 NTT(f)                                       --> ntt.rs
// Algorithm 9 NTT−1(fˆ)                                    --> ntt.rs
// Algorithm 10 MultiplyNTTs(fˆ,ĝ)                          --> ntt.rs
// Algorithm 11 BaseCaseMultiply(a0,a1,b0,b1,γ)             --> ntt.rs
// Algorithm 12 K-PKE.KeyGen()                              --> k_pke.rs
// Algorithm 13 K-PKE.Encrypt(ekPKE,m,r)                    --> k_pke.rs
// Algorithm 14 K-PKE.Decrypt(dkPKE,c)                      --> k_pke.rs
// Algorithm 15 ML-KEM.KeyGen()                             --> ml_kem.rs
// Algorithm 16 ML-KEM.Encaps(ek)                           --> ml_kem.rs
// Algorithm 17 ML-KEM.Decaps(c,dk)                         --> ml_kem.rs
// PRF and XOF                                              --> helpers.rs
// Three hash functions: G, H, J                            --> helpers.rs
// Compress and Decompress                                  --> helpers.rs
//
// This crate covers only the ML-KEM-768 parameter set (K=3, ETA1=ETA2=2, DU=10, DV=4), so the
// per-parameter-set constants and public types below are plain crate-root items rather than a
// macro expanded once per parameter set. A second parameter set could be reintroduced later as
// another module with its own constant block, without touching byte_fns.rs/ntt.rs/k_pke.rs/
// ml_kem.rs/sampling.rs/helpers.rs, which remain parameter-set agnostic.
//
// Note that the use of generics has been constrained to storage allocation purposes,
// e.g. `[0u8; EK_LEN];` (where arithmetic expressions are not allowed), while the remainder
// of the security parameters are generally passed as normal function parameters.
//
// The ensure!() instances are for validation purposes and cannot be turned off. The
// debug_assert!() instances target internal invariants that cannot be reached through the
// public API without a caller bypassing SerDes, and compile out of release builds.


/// The `rand_core` types are re-exported so that users of this crate do not
/// have to worry about using the exact correct version of `rand_core`.
pub use rand_core::{CryptoRng, Error as RngError, RngCore};

use crate::byte_fns::byte_decode;
use crate::helpers::{ensure, h};
use crate::ml_kem::{ml_kem_decaps, ml_kem_encaps, ml_kem_key_gen};
use crate::traits::{Decaps, Encaps, KeyGen, SerDes};
use crate::types::Z;
use rand_core::CryptoRngCore;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

mod byte_fns;
mod helpers;
mod k_pke;
mod ml_kem;
mod ntt;
mod sampling;
mod types;

/// All functionality is covered by traits, such that consumers can utilize trait objects if desired.
pub mod traits;

const Q: u16 = 3329;
const ZETA: u16 = 17;

// ML-KEM-768 security parameters (FIPS 203 category 3), see table 2 & 3 of the standard.
const K: usize = 3;
const ETA1: u32 = 2;
const ETA2: u32 = 2;
const DU: u32 = 10;
const DV: u32 = 4;

/// Serialized Encapsulation Key Length (in bytes)
pub const EK_LEN: usize = 1184;
/// Serialized Decapsulation Key Length (in bytes)
pub const DK_LEN: usize = 2400;
/// Serialized Ciphertext Length (in bytes)
pub const CT_LEN: usize = 1088;
/// Shared Secret Key Length (in bytes)
pub const SSK_LEN: usize = 32;

/// Correctly sized encapsulation key for the ML-KEM-768 parameter set.
pub type EncapsKey = crate::types::EncapsKey<EK_LEN>;

/// Correctly sized decapsulation key for the ML-KEM-768 parameter set.
pub type DecapsKey = crate::types::DecapsKey<DK_LEN>;

/// Correctly sized ciphertext for the ML-KEM-768 parameter set.
pub type CipherText = crate::types::CipherText<CT_LEN>;

/// The (opaque) shared secret key that can be de/serialized by each party.
#[derive(Clone, Debug, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecretKey([u8; SSK_LEN]);


impl SerDes for SharedSecretKey {
    type ByteArray = [u8; SSK_LEN];

    fn into_bytes(self) -> Self::ByteArray { self.0 }

    fn try_from_bytes(ssk: Self::ByteArray) -> Result<Self, &'static str> {
        // The `try_` is not really needed but implemented for symmetry/consistency, e.g., there
        // is no opportunity for validation (yet), but using a Result for the future possibility
        Ok(SharedSecretKey(ssk))
    }
}


// Conservative (constant-time) support...
impl PartialEq for SharedSecretKey {
    fn eq(&self, other: &Self) -> bool { bool::from(self.0.ct_eq(&other.0)) }
}


/// Supports the `KeyGen` trait, allowing for keypair generation.
pub struct KG();


impl KeyGen for KG {
    type DecapsByteArray = [u8; DK_LEN];
    type DecapsKey = DecapsKey;
    type EncapsByteArray = [u8; EK_LEN];
    type EncapsKey = EncapsKey;

    fn try_keygen_with_rng(
        rng: &mut impl CryptoRngCore,
    ) -> Result<(EncapsKey, DecapsKey), &'static str> {
        let (mut ek, mut dk) = ([0u8; EK_LEN], [0u8; DK_LEN]);
        ml_kem_key_gen::<K, { ETA1 as usize * 64 }>(rng, &mut ek, &mut dk)?;
        Ok((EncapsKey { 0: ek }, DecapsKey { 0: dk }))
    }

    #[allow(clippy::items_after_statements)] // Introduce A5Rng just when needed prior to encaps
    fn validate_keypair_vartime(
        ek: &Self::EncapsByteArray, dk: &Self::DecapsByteArray,
    ) -> bool {
        // Note that size is checked by only accepting a ref to a correctly sized byte array
        let len_ek_pke = 384 * K + 32;
        let len_dk_pke = 384 * K;
        // 1. dk should contain ek
        if !(*ek == dk[len_dk_pke..(len_dk_pke + len_ek_pke)]) {
            return false;
        };
        // 2. dk should contain hash of ek
        if !(h(ek) == dk[(len_dk_pke + len_ek_pke)..(len_dk_pke + len_ek_pke + 32)]) {
            return false;
        };
        // 3. ek and dk should deserialize ok
        let ek = EncapsKey::try_from_bytes(*ek);
        let dk = DecapsKey::try_from_bytes(*dk);
        if ek.is_err() || dk.is_err() {
            return false;
        };
        // A dummy RNG for use in `try_encaps_with_rng()` so that it doesn't require an external RNG
        struct A5Rng();
        impl RngCore for A5Rng {
            fn next_u32(&mut self) -> u32 { unimplemented!() }

            fn next_u64(&mut self) -> u64 { unimplemented!() }

            fn fill_bytes(&mut self, _out: &mut [u8]) { unimplemented!() }

            fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), rand_core::Error> {
                out.iter_mut().for_each(|b| *b = 0xa5);
                Ok(())
            }
        }
        impl CryptoRng for A5Rng {}
        let mut a5rng = A5Rng {};
        // 4. encaps should run without a problem
        let ek_res = ek.unwrap().try_encaps_with_rng(&mut a5rng);
        if ek_res.is_err() {
            return false;
        };
        // 5. decaps should run without a problem
        let dk_res = dk.unwrap().try_decaps(&ek_res.as_ref().unwrap().1);
        if dk_res.is_err() {
            return false;
        };
        // 6. encaps and decaps should produce the same shared secret
        return ek_res.unwrap().0 == dk_res.unwrap();
    }
}


impl Encaps for EncapsKey {
    type CipherText = CipherText;
    type SharedSecretKey = SharedSecretKey;

    fn try_encaps_with_rng(
        &self, rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::SharedSecretKey, Self::CipherText), &'static str> {
        let mut ct = [0u8; CT_LEN];
        let ssk = ml_kem_encaps::<K, { ETA1 as usize * 64 }, { ETA2 as usize * 64 }>(
            rng, DU, DV, &self.0, &mut ct,
        )?;
        Ok((ssk, CipherText { 0: ct }))
    }
}


impl Decaps for DecapsKey {
    type CipherText = CipherText;
    type SharedSecretKey = SharedSecretKey;

    fn try_decaps(&self, ct: &CipherText) -> Result<SharedSecretKey, &'static str> {
        ml_kem_decaps::<
            K,
            { ETA1 as usize * 64 },
            { ETA2 as usize * 64 },
            { 32 + 32 * (DU as usize * K + DV as usize) },
            CT_LEN,
        >(DU, DV, &self.0, &ct.0)
    }
}


impl SerDes for EncapsKey {
    type ByteArray = [u8; EK_LEN];

    fn into_bytes(self) -> Self::ByteArray { self.0 }

    fn try_from_bytes(ek: Self::ByteArray) -> Result<Self, &'static str> {
        // Validation per FIPS 203 §7: "the byte array containing the encapsulation key
        // correctly decodes to an array of integers modulo q without any modular reductions".
        // Note that accepting a byte array of fixed size, rather than a slice of varied size,
        // addresses the length check.
        let mut ek_hat = [Z::default(); 256];
        for i in 0..K {
            byte_decode(12, &ek[384 * i..384 * (i + 1)], &mut ek_hat)?;
        }
        Ok(EncapsKey { 0: ek })
    }
}


impl SerDes for DecapsKey {
    type ByteArray = [u8; DK_LEN];

    fn into_bytes(self) -> Self::ByteArray { self.0 }

    fn try_from_bytes(dk: Self::ByteArray) -> Result<Self, &'static str> {
        // Validation per FIPS 203 §7. Note that the two checks specify fixed sizes, and these
        // functions take only byte arrays of correct size. Nonetheless, we take the opportunity
        // to validate the ek and h(ek).
        let len_ek_pke = 384 * K + 32;
        let len_dk_pke = 384 * K;
        let ek = &dk[len_dk_pke..len_dk_pke + EK_LEN];
        let _res = EncapsKey::try_from_bytes(ek.try_into().map_err(|_| "Malformed encaps key")?)?;
        ensure!(
            h(ek) == dk[(len_dk_pke + len_ek_pke)..(len_dk_pke + len_ek_pke + 32)],
            "Encaps hash wrong"
        );
        Ok(DecapsKey { 0: dk })
    }
}


impl SerDes for CipherText {
    type ByteArray = [u8; CT_LEN];

    fn into_bytes(self) -> Self::ByteArray { self.0 }

    fn try_from_bytes(ct: Self::ByteArray) -> Result<Self, &'static str> {
        // Validation per FIPS 203 §7. Note that the checks specify fixed sizes, and these
        // functions take only byte arrays of correct size. Nonetheless, we use a Result here in
        // case future opportunities for further validation arise.
        Ok(CipherText { 0: ct })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn smoke_test() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        for _i in 0..100 {
            let (ek, dk) = KG::try_keygen_with_rng(&mut rng).unwrap();
            let (ssk1, ct) = ek.try_encaps_with_rng(&mut rng).unwrap();
            let ssk2 = dk.try_decaps(&ct).unwrap();
            assert!(KG::validate_keypair_vartime(
                &ek.clone().into_bytes(),
                &dk.clone().into_bytes()
            ));
            assert_eq!(ssk1, ssk2);
            assert_eq!(
                ek.clone().into_bytes(),
                EncapsKey::try_from_bytes(ek.into_bytes()).unwrap().into_bytes()
            );
            assert_eq!(
                dk.clone().into_bytes(),
                DecapsKey::try_from_bytes(dk.into_bytes()).unwrap().into_bytes()
            );
        }
    }
}
