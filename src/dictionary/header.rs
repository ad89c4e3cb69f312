use crate::dictionary::read;
use crate::errors::{Result, StaccatoError};

/// Size of the zero-padded description field.
pub const DESCRIPTION_SIZE: usize = 256;

/// Total size of the header region.
pub const HEADER_STORAGE_SIZE: usize = 8 + 8 + DESCRIPTION_SIZE;

const SYSTEM_DICT_VERSION: u64 = 0x7366_d3f1_8bd1_11e7;
const USER_DICT_VERSION_1: u64 = 0xa50f_3118_8bd2_11e7;
const USER_DICT_VERSION_2: u64 = 0x9fde_b5a9_0168_d868;

/// Version magic of a binary dictionary.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum DictionaryVersion {
    /// System dictionary.
    System,
    /// User dictionary without a grammar block.
    UserV1,
    /// User dictionary carrying its own POS extension grammar.
    UserV2,
}

impl DictionaryVersion {
    pub fn from_magic(magic: u64) -> Option<Self> {
        match magic {
            SYSTEM_DICT_VERSION => Some(Self::System),
            USER_DICT_VERSION_1 => Some(Self::UserV1),
            USER_DICT_VERSION_2 => Some(Self::UserV2),
            _ => None,
        }
    }

    pub const fn magic(self) -> u64 {
        match self {
            Self::System => SYSTEM_DICT_VERSION,
            Self::UserV1 => USER_DICT_VERSION_1,
            Self::UserV2 => USER_DICT_VERSION_2,
        }
    }

    /// Whether a grammar block follows the header.
    pub const fn has_grammar(self) -> bool {
        matches!(self, Self::System | Self::UserV2)
    }

    pub const fn is_user(self) -> bool {
        matches!(self, Self::UserV1 | Self::UserV2)
    }
}

/// 272-byte dictionary header: version magic, creation time, and a
/// zero-padded UTF-8 description.
pub struct DictionaryHeader {
    pub version: DictionaryVersion,
    pub create_time: i64,
    pub description: String,
}

impl DictionaryHeader {
    pub fn new(version: DictionaryVersion, create_time: i64, description: String) -> Self {
        Self {
            version,
            create_time,
            description,
        }
    }

    pub fn parse(buf: &[u8]) -> Result<Self> {
        let (offset, magic) = read::u64_at(buf, 0)?;
        let version = DictionaryVersion::from_magic(magic).ok_or_else(|| {
            StaccatoError::corrupt_dictionary(format!("unknown dictionary version {magic:#x}"))
        })?;
        let (offset, create_time) = read::i64_at(buf, offset)?;
        let (_, raw) = read::bytes_at(buf, offset, DESCRIPTION_SIZE)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        let description = std::str::from_utf8(&raw[..end])
            .map_err(|_| StaccatoError::corrupt_dictionary("description is not valid UTF-8"))?
            .to_string();
        Ok(Self {
            version,
            create_time,
            description,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let desc = self.description.as_bytes();
        if desc.len() > DESCRIPTION_SIZE {
            return Err(StaccatoError::overflow(
                "description must be no longer than 256 bytes",
            ));
        }
        let mut buf = Vec::with_capacity(HEADER_STORAGE_SIZE);
        buf.extend_from_slice(&self.version.magic().to_le_bytes());
        buf.extend_from_slice(&self.create_time.to_le_bytes());
        buf.extend_from_slice(desc);
        buf.resize(HEADER_STORAGE_SIZE, 0);
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let header = DictionaryHeader::new(
            DictionaryVersion::System,
            1_530_000_000,
            "a test dictionary".to_string(),
        );
        let bytes = header.to_bytes().unwrap();
        assert_eq!(bytes.len(), HEADER_STORAGE_SIZE);
        let parsed = DictionaryHeader::parse(&bytes).unwrap();
        assert_eq!(parsed.version, DictionaryVersion::System);
        assert_eq!(parsed.create_time, 1_530_000_000);
        assert_eq!(parsed.description, "a test dictionary");
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = DictionaryHeader::new(DictionaryVersion::UserV1, 0, String::new())
            .to_bytes()
            .unwrap();
        bytes[0] ^= 0xFF;
        assert!(DictionaryHeader::parse(&bytes).is_err());
    }

    #[test]
    fn test_description_overflow() {
        let header = DictionaryHeader::new(DictionaryVersion::System, 0, "x".repeat(257));
        assert!(header.to_bytes().is_err());
    }

    #[test]
    fn test_grammar_dispatch() {
        assert!(DictionaryVersion::System.has_grammar());
        assert!(!DictionaryVersion::UserV1.has_grammar());
        assert!(DictionaryVersion::UserV2.has_grammar());
        assert!(!DictionaryVersion::System.is_user());
        assert!(DictionaryVersion::UserV1.is_user());
    }
}
