//! Perceptual image hashing for similarity detection.
//!
//! This module provides the [`PerceptualHasher`] which turns a decodable
//! image into a fixed-length [`Fingerprint`]. The default algorithm is a
//! difference hash: the image is shrunk to a 9x8 luminance grid and each
//! bit records whether a pixel is brighter than its right-hand neighbour.
//! Fingerprints are compared with Hamming distance.

use image_hasher::{HashAlg, HasherConfig, ImageHash};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Side length of the hash grid. Every algorithm produces `HASH_SIDE²` bits.
pub const HASH_SIDE: u32 = 8;

/// Supported perceptual hashing algorithms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PerceptualAlgorithm {
    /// dHash (Difference Hash) - Gradient-based, very fast and effective.
    #[default]
    Dhash,
    /// pHash (Perceptual Hash) - DCT-based, most resilient to transformations.
    Phash,
    /// aHash (Average Hash) - Mean-based, fast but less resilient.
    Ahash,
}

impl PerceptualAlgorithm {
    /// Number of bits in fingerprints produced by this algorithm.
    ///
    /// This is also the largest possible distance between two fingerprints.
    #[must_use]
    pub fn bits(&self) -> u32 {
        HASH_SIDE * HASH_SIDE
    }
}

impl fmt::Display for PerceptualAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dhash => write!(f, "dHash"),
            Self::Phash => write!(f, "pHash"),
            Self::Ahash => write!(f, "aHash"),
        }
    }
}

/// Errors that can occur during perceptual hashing.
#[derive(Debug, Error)]
pub enum PerceptualError {
    /// Failed to open or decode the image.
    #[error("Failed to load image {0}: {1}")]
    LoadError(String, #[source] image::ImageError),
}

/// A perceptual fingerprint: a packed bit vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    bytes: Box<[u8]>,
}

impl Fingerprint {
    /// Build a fingerprint from packed bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Build a 64-bit fingerprint from an integer (big-endian bit order).
    #[must_use]
    pub fn from_u64(bits: u64) -> Self {
        Self::from_bytes(&bits.to_be_bytes())
    }

    /// Packed bytes of this fingerprint.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the bit vector.
    #[must_use]
    pub fn bits(&self) -> u32 {
        (self.bytes.len() * 8) as u32
    }

    /// Hamming distance to another fingerprint.
    ///
    /// Returns `None` when the fingerprints have different lengths and
    /// therefore cannot be compared.
    #[must_use]
    pub fn distance(&self, other: &Fingerprint) -> Option<u32> {
        if self.bytes.len() != other.bytes.len() {
            return None;
        }

        Some(
            self.bytes
                .iter()
                .zip(other.bytes.iter())
                .map(|(a, b)| (a ^ b).count_ones())
                .sum(),
        )
    }

    /// Lowercase hex rendering of the packed bytes.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl From<ImageHash> for Fingerprint {
    fn from(hash: ImageHash) -> Self {
        Self::from_bytes(hash.as_bytes())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Computes perceptual fingerprints for images.
pub struct PerceptualHasher {
    hasher: image_hasher::Hasher,
    algorithm: PerceptualAlgorithm,
}

impl PerceptualHasher {
    /// Create a new `PerceptualHasher` with the given algorithm.
    #[must_use]
    pub fn new(algorithm: PerceptualAlgorithm) -> Self {
        let mut config = HasherConfig::new().hash_size(HASH_SIDE, HASH_SIDE);

        match algorithm {
            PerceptualAlgorithm::Dhash => {
                config = config.hash_alg(HashAlg::Gradient);
            }
            PerceptualAlgorithm::Phash => {
                config = config.hash_alg(HashAlg::Median).preproc_dct();
            }
            PerceptualAlgorithm::Ahash => {
                config = config.hash_alg(HashAlg::Mean);
            }
        }

        Self {
            hasher: config.to_hasher(),
            algorithm,
        }
    }

    /// Decode the image at `path` and compute its fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`PerceptualError::LoadError`] if the file cannot be opened
    /// or its format cannot be decoded.
    pub fn compute<P: AsRef<Path>>(&self, path: P) -> Result<Fingerprint, PerceptualError> {
        let path = path.as_ref();
        let load_error =
            |e: image::ImageError| PerceptualError::LoadError(path.display().to_string(), e);
        // Sniff the content; the extension only decides which files get here
        let img = image::ImageReader::open(path)
            .and_then(image::ImageReader::with_guessed_format)
            .map_err(|e| load_error(image::ImageError::IoError(e)))?
            .decode()
            .map_err(load_error)?;

        Ok(self.hasher.hash_image(&img).into())
    }

    /// Get the algorithm used by this hasher.
    #[must_use]
    pub fn algorithm(&self) -> PerceptualAlgorithm {
        self.algorithm
    }
}

impl Default for PerceptualHasher {
    fn default() -> Self {
        Self::new(PerceptualAlgorithm::default())
    }
}

impl fmt::Debug for PerceptualHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerceptualHasher")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::new(width, height);
        for x in 0..width {
            for y in 0..height {
                let val = ((x * 255) / width.max(1)) as u8;
                img.put_pixel(x, y, Rgb([val, val, val]));
            }
        }
        img
    }

    #[test]
    fn test_perceptual_algorithms_display() {
        assert_eq!(PerceptualAlgorithm::Dhash.to_string(), "dHash");
        assert_eq!(PerceptualAlgorithm::Phash.to_string(), "pHash");
        assert_eq!(PerceptualAlgorithm::Ahash.to_string(), "aHash");
        assert_eq!(PerceptualAlgorithm::default(), PerceptualAlgorithm::Dhash);
    }

    #[test]
    fn test_algorithm_bits() {
        assert_eq!(PerceptualAlgorithm::Dhash.bits(), 64);
        assert_eq!(PerceptualAlgorithm::Phash.bits(), 64);
        assert_eq!(PerceptualAlgorithm::Ahash.bits(), 64);
    }

    #[test]
    fn test_fingerprint_distance() {
        let a = Fingerprint::from_u64(0);
        let b = Fingerprint::from_u64(0b111);
        let c = Fingerprint::from_u64(u64::MAX);

        assert_eq!(a.distance(&a), Some(0));
        assert_eq!(a.distance(&b), Some(3));
        assert_eq!(b.distance(&a), Some(3));
        assert_eq!(a.distance(&c), Some(64));
        assert_eq!(a.bits(), 64);
    }

    #[test]
    fn test_fingerprint_length_mismatch_is_incomparable() {
        let short = Fingerprint::from_bytes(&[0, 0]);
        let long = Fingerprint::from_u64(0);

        assert_eq!(short.distance(&long), None);
    }

    #[test]
    fn test_fingerprint_hex() {
        let fp = Fingerprint::from_u64(0x0123_4567_89ab_cdef);
        assert_eq!(fp.to_hex(), "0123456789abcdef");
        assert_eq!(fp.to_string(), "0123456789abcdef");
    }

    #[test]
    fn test_invalid_image() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("invalid.png");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "not an image").unwrap();

        let hasher = PerceptualHasher::default();
        assert!(hasher.compute(&file_path).is_err());
    }

    #[test]
    fn test_compute_real_image_is_64_bits() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("gradient.png");
        gradient_image(32, 32).save(&file_path).unwrap();

        let hasher = PerceptualHasher::new(PerceptualAlgorithm::Dhash);
        let fp = hasher.compute(&file_path).unwrap();

        assert_eq!(fp.bits(), 64);
    }

    #[test]
    fn test_misnamed_image_is_decoded_by_content() {
        let temp_dir = tempdir().unwrap();
        let png_path = temp_dir.path().join("real.png");
        let misnamed = temp_dir.path().join("actually_png.jpg");
        gradient_image(32, 32).save(&png_path).unwrap();
        std::fs::copy(&png_path, &misnamed).unwrap();

        let hasher = PerceptualHasher::default();
        let expected = hasher.compute(&png_path).unwrap();
        let fp = hasher.compute(&misnamed).unwrap();

        assert_eq!(fp.distance(&expected), Some(0));
    }

    #[test]
    fn test_missing_image_is_load_error() {
        let temp_dir = tempdir().unwrap();
        let hasher = PerceptualHasher::default();
        let err = hasher.compute(temp_dir.path().join("gone.png")).unwrap_err();
        assert!(matches!(err, PerceptualError::LoadError(_, image::ImageError::IoError(_))));
    }

    #[test]
    fn test_identical_images_have_distance_zero() {
        let temp_dir = tempdir().unwrap();
        let path1 = temp_dir.path().join("one.png");
        let path2 = temp_dir.path().join("two.png");
        gradient_image(40, 40).save(&path1).unwrap();
        std::fs::copy(&path1, &path2).unwrap();

        let hasher = PerceptualHasher::default();
        let fp1 = hasher.compute(&path1).unwrap();
        let fp2 = hasher.compute(&path2).unwrap();

        assert_eq!(fp1.distance(&fp2), Some(0));
    }
}
