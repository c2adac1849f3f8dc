// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Textual checksum encoding for build-to-artifact linkage.
//!
//! Artifact nodes carry multi-valued properties listing the prefixed
//! checksums (`sha1:<hex>`, `md5:<hex>`) of every build artifact or
//! dependency that touched them; the build search engine treats those
//! values as an inverted index from checksum to owning build.

use std::fmt;
use std::str::FromStr;

use derive_more::Display;
use sha1::{Digest, Sha1};
use thiserror::Error;

const SHA1_HEX_LEN: usize = 40;
const MD5_HEX_LEN: usize = 32;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ChecksumError {
    #[error("unsupported checksum algorithm '{0}'")]
    UnknownAlgorithm(String),
    #[error("invalid {algorithm} hex digest '{digest}'")]
    InvalidDigest {
        algorithm: ChecksumAlgorithm,
        digest: String,
    },
}

/// A digest algorithm used for build linkage.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Display)]
pub enum ChecksumAlgorithm {
    #[display("sha1")]
    Sha1,
    #[display("md5")]
    Md5,
}

impl ChecksumAlgorithm {
    pub const fn hex_len(&self) -> usize {
        match self {
            ChecksumAlgorithm::Sha1 => SHA1_HEX_LEN,
            ChecksumAlgorithm::Md5 => MD5_HEX_LEN,
        }
    }
}

/// A validated, lowercase-hex checksum with its algorithm prefix.
///
/// The canonical text form is `"<algo>:<lowercasehex>"`, which is exactly
/// how the value is stored on nodes and matched in queries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checksum {
    algorithm: ChecksumAlgorithm,
    hex: String,
}

impl Checksum {
    /// Validate a bare hex digest for the given algorithm.
    pub fn new(algorithm: ChecksumAlgorithm, hex_digest: &str) -> Result<Self, ChecksumError> {
        let hex_digest = hex_digest.trim();
        if hex_digest.len() != algorithm.hex_len() || hex::decode(hex_digest).is_err() {
            return Err(ChecksumError::InvalidDigest {
                algorithm,
                digest: hex_digest.to_owned(),
            });
        }
        Ok(Self {
            algorithm,
            hex: hex_digest.to_ascii_lowercase(),
        })
    }

    pub fn sha1_of(data: &[u8]) -> Self {
        Self {
            algorithm: ChecksumAlgorithm::Sha1,
            hex: hex::encode(Sha1::digest(data)),
        }
    }

    pub fn md5_of(data: &[u8]) -> Self {
        Self {
            algorithm: ChecksumAlgorithm::Md5,
            hex: hex::encode(md5::compute(data).0),
        }
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

impl FromStr for Checksum {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algo, digest) = s
            .split_once(':')
            .ok_or_else(|| ChecksumError::UnknownAlgorithm(s.to_owned()))?;
        let algorithm = match algo {
            "sha1" => ChecksumAlgorithm::Sha1,
            "md5" => ChecksumAlgorithm::Md5,
            other => return Err(ChecksumError::UnknownAlgorithm(other.to_owned())),
        };
        Checksum::new(algorithm, digest)
    }
}
