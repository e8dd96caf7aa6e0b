//! Checksum verification for downloaded files.
//!
//! Digests are computed incrementally: a file is read once, in fixed-size
//! blocks, and every requested algorithm is fed from the same buffer.
//!
//! # Supported Algorithms
//!
//! `md5`, `sha1`, `sha224`, `sha256`, `sha384`, `sha512`, `blake3` and `crc32`.
//! Names are matched case-insensitively and `-`/`_` separators are ignored, so
//! `SHA-256` and `sha_256` both name SHA-256.
//!
//! # Examples
//!
//! ```rust
//! use steadyfetch::download::checksum::{HashAlgorithm, Hasher};
//!
//! let algorithm: HashAlgorithm = "sha256".parse()?;
//! let mut hasher = Hasher::new(algorithm);
//! hasher.update(b"");
//! assert_eq!(
//!     hasher.hex_digest(),
//!     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
//! );
//! # Ok::<(), steadyfetch::Error>(())
//! ```

use crate::error::{Error, Result};

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::{debug, warn};

/// Read buffer used when hashing a file.
const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Hash algorithms a checksum may be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Blake3,
    /// CRC-32 (IEEE), rendered as eight lowercase hex digits.
    Crc32,
}

impl HashAlgorithm {
    /// Canonical lowercase name of the algorithm.
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "md5",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::Crc32 => "crc32",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            "blake3" => Ok(HashAlgorithm::Blake3),
            "crc32" => Ok(HashAlgorithm::Crc32),
            _ => Err(Error::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// How several expected checksums combine into one verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumPolicy {
    /// The file is valid as soon as one supported algorithm matches.
    #[default]
    Any,
    /// Every supported algorithm must match.
    All,
}

/// An incremental hasher for one [`HashAlgorithm`].
pub struct Hasher {
    algorithm: HashAlgorithm,
    state: HasherState,
}

enum HasherState {
    Md5(Md5),
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
    Blake3(Box<blake3::Hasher>),
    Crc32(crc32fast::Hasher),
}

impl Hasher {
    /// Creates an empty hasher for `algorithm`.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let state = match algorithm {
            HashAlgorithm::Md5 => HasherState::Md5(Md5::new()),
            HashAlgorithm::Sha1 => HasherState::Sha1(Sha1::new()),
            HashAlgorithm::Sha224 => HasherState::Sha224(Sha224::new()),
            HashAlgorithm::Sha256 => HasherState::Sha256(Sha256::new()),
            HashAlgorithm::Sha384 => HasherState::Sha384(Sha384::new()),
            HashAlgorithm::Sha512 => HasherState::Sha512(Sha512::new()),
            HashAlgorithm::Blake3 => HasherState::Blake3(Box::new(blake3::Hasher::new())),
            HashAlgorithm::Crc32 => HasherState::Crc32(crc32fast::Hasher::new()),
        };
        Self { algorithm, state }
    }

    /// Creates a hasher from an algorithm name.
    ///
    /// Fails with [`Error::UnsupportedAlgorithm`] for unknown names.
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse().map(Self::new)
    }

    /// The algorithm this hasher computes.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Feeds `data` into the digest.
    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HasherState::Md5(h) => h.update(data),
            HasherState::Sha1(h) => h.update(data),
            HasherState::Sha224(h) => h.update(data),
            HasherState::Sha256(h) => h.update(data),
            HasherState::Sha384(h) => h.update(data),
            HasherState::Sha512(h) => h.update(data),
            HasherState::Blake3(h) => {
                h.update(data);
            }
            HasherState::Crc32(h) => h.update(data),
        }
    }

    /// Consumes the hasher and returns the lowercase hex digest.
    pub fn hex_digest(self) -> String {
        match self.state {
            HasherState::Md5(h) => hex::encode(h.finalize()),
            HasherState::Sha1(h) => hex::encode(h.finalize()),
            HasherState::Sha224(h) => hex::encode(h.finalize()),
            HasherState::Sha256(h) => hex::encode(h.finalize()),
            HasherState::Sha384(h) => hex::encode(h.finalize()),
            HasherState::Sha512(h) => hex::encode(h.finalize()),
            HasherState::Blake3(h) => h.finalize().to_hex().to_string(),
            HasherState::Crc32(h) => format!("{:08x}", h.finalize()),
        }
    }
}

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hasher")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Compute the hex digests of a file for several algorithms in one pass.
pub async fn file_digests(path: &Path, algorithms: &[HashAlgorithm]) -> Result<Vec<String>> {
    let mut hashers: Vec<Hasher> = algorithms.iter().copied().map(Hasher::new).collect();
    let mut file = File::open(path).await?;
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        for hasher in &mut hashers {
            hasher.update(&buffer[..read]);
        }
    }

    Ok(hashers.into_iter().map(Hasher::hex_digest).collect())
}

/// Compute the hex digest of a file.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use steadyfetch::download::checksum::{file_digest, HashAlgorithm};
///
/// # async fn example() -> Result<(), steadyfetch::Error> {
/// let digest = file_digest(Path::new("archive.tar.gz"), HashAlgorithm::Sha256).await?;
/// println!("{}", digest);
/// # Ok(())
/// # }
/// ```
pub async fn file_digest(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    let mut digests = file_digests(path, &[algorithm]).await?;
    digests
        .pop()
        .ok_or_else(|| Error::Internal("no digest computed".into()))
}

/// Verify a local file against a set of expected checksums.
///
/// Unsupported algorithm names are skipped with a warning. A file is never
/// valid when none of the supplied names is usable. Comparison ignores case.
///
/// # Returns
///
/// * `Ok(true)` if the checksums satisfy `policy`
/// * `Ok(false)` on mismatch or when no usable algorithm was supplied
/// * `Err` if the file cannot be read
pub async fn validate_file(
    path: &Path,
    expected: &BTreeMap<String, String>,
    policy: ChecksumPolicy,
) -> Result<bool> {
    let mut usable: Vec<(HashAlgorithm, &str)> = Vec::with_capacity(expected.len());
    for (name, hex_digest) in expected {
        match name.parse::<HashAlgorithm>() {
            Ok(algorithm) => usable.push((algorithm, hex_digest.trim())),
            Err(_) => warn!(algorithm = %name, "Unsupported hash algorithm, skipping"),
        }
    }

    if usable.is_empty() {
        warn!(path = %path.display(), "No usable checksum algorithm provided");
        return Ok(false);
    }

    let algorithms: Vec<HashAlgorithm> = usable.iter().map(|(a, _)| *a).collect();
    let actual = file_digests(path, &algorithms).await?;

    let mut matched = 0;
    for ((algorithm, expected), actual) in usable.iter().zip(actual.iter()) {
        if actual.eq_ignore_ascii_case(expected) {
            debug!(path = %path.display(), %algorithm, "Checksum validated");
            matched += 1;
            if policy == ChecksumPolicy::Any {
                return Ok(true);
            }
        } else {
            warn!(
                path = %path.display(),
                %algorithm,
                expected = %expected,
                actual = %actual,
                "Checksum mismatch"
            );
            if policy == ChecksumPolicy::All {
                return Ok(false);
            }
        }
    }

    Ok(matched > 0 && matched == usable.len())
}
