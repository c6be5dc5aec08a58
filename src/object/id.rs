use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::core::errors::KnowledgeError;

const DIGEST_LEN: usize = 32;

/// Kind of stored unit. Only a few kinds mean anything to context assembly;
/// the rest travel as opaque codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectType {
    Document,
    Chunk,
    Image,
    Video,
    Email,
    Other(u8),
}

impl ObjectType {
    pub fn code(self) -> u8 {
        match self {
            ObjectType::Document => 1,
            ObjectType::Chunk => 2,
            ObjectType::Image => 3,
            ObjectType::Video => 4,
            ObjectType::Email => 5,
            ObjectType::Other(code) => code,
        }
    }

    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ObjectType::Document,
            2 => ObjectType::Chunk,
            3 => ObjectType::Image,
            4 => ObjectType::Video,
            5 => ObjectType::Email,
            other => ObjectType::Other(other),
        }
    }
}

/// Content-addressed identifier: a type tag plus the SHA-256 of the content.
///
/// The canonical string form is the lowercase hex of the tag byte followed by
/// the digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    object_type: ObjectType,
    digest: [u8; DIGEST_LEN],
}

impl ObjectId {
    pub fn new(object_type: ObjectType, digest: [u8; DIGEST_LEN]) -> Self {
        Self {
            object_type,
            digest,
        }
    }

    pub fn from_content(object_type: ObjectType, content: &[u8]) -> Self {
        let digest: [u8; DIGEST_LEN] = Sha256::digest(content).into();
        Self::new(object_type, digest)
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }

    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}{}",
            self.object_type.code(),
            hex::encode(self.digest)
        )
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({:?}, {})", self.object_type, self)
    }
}

impl FromStr for ObjectId {
    type Err = KnowledgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim())
            .map_err(|err| KnowledgeError::Resolution(format!("malformed object id {s:?}: {err}")))?;
        if bytes.len() != DIGEST_LEN + 1 {
            return Err(KnowledgeError::Resolution(format!(
                "object id {s:?} has {} bytes, expected {}",
                bytes.len(),
                DIGEST_LEN + 1
            )));
        }

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&bytes[1..]);
        Ok(Self::new(ObjectType::from_code(bytes[0]), digest))
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
