//! Binary security identifiers.
//!
//! Layout: revision (1 byte), sub-authority count (1 byte), identifier
//! authority (6 bytes, big-endian), then `count` little-endian `u32`
//! sub-authorities.
use std::fmt;

/// Largest sub-authority count a valid SID may carry.
pub const MAX_SUB_AUTHORITIES: usize = 15;

const HEADER_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SidError {
    #[error("SID buffer too short: {0} bytes")]
    TooShort(usize),
    #[error("unsupported SID revision {0}")]
    Revision(u8),
    #[error("SID declares {0} sub-authorities (max 15)")]
    TooManySubAuthorities(usize),
    #[error("SID length {actual} does not match {expected} expected for its sub-authority count")]
    Length { expected: usize, actual: usize },
    #[error("identifier authority {0:#x} does not fit in 48 bits")]
    AuthorityTooWide(u64),
}

/// A revision 1 SID. Always holds a 48-bit authority and at most
/// [`MAX_SUB_AUTHORITIES`] sub-authorities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sid {
    revision: u8,
    authority: u64,
    sub_authorities: Vec<u32>,
}

impl Sid {
    pub fn new(authority: u64, sub_authorities: &[u32]) -> Result<Self, SidError> {
        if sub_authorities.len() > MAX_SUB_AUTHORITIES {
            return Err(SidError::TooManySubAuthorities(sub_authorities.len()));
        }
        if authority >> 48 != 0 {
            return Err(SidError::AuthorityTooWide(authority));
        }
        Ok(Self {
            revision: 1,
            authority,
            sub_authorities: sub_authorities.to_vec(),
        })
    }

    /// Parse a SID from exactly the bytes it occupies.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SidError> {
        if bytes.len() < HEADER_LEN {
            return Err(SidError::TooShort(bytes.len()));
        }
        let revision = bytes[0];
        if revision != 1 {
            return Err(SidError::Revision(revision));
        }
        let count = bytes[1] as usize;
        if count > MAX_SUB_AUTHORITIES {
            return Err(SidError::TooManySubAuthorities(count));
        }
        let expected = HEADER_LEN + 4 * count;
        if bytes.len() != expected {
            return Err(SidError::Length {
                expected,
                actual: bytes.len(),
            });
        }
        let authority = bytes[2..HEADER_LEN]
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
        let sub_authorities = bytes[HEADER_LEN..]
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self {
            revision,
            authority,
            sub_authorities,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + 4 * self.sub_authorities.len());
        out.push(self.revision);
        // bounded by MAX_SUB_AUTHORITIES at construction
        out.push(self.sub_authorities.len() as u8);
        out.extend_from_slice(&self.authority.to_be_bytes()[2..]);
        for sub in &self.sub_authorities {
            out.extend_from_slice(&sub.to_le_bytes());
        }
        out
    }

    pub fn revision(&self) -> u8 {
        self.revision
    }

    /// Identifier authority (48 bits).
    pub fn authority(&self) -> u64 {
        self.authority
    }

    pub fn sub_authorities(&self) -> &[u32] {
        &self.sub_authorities
    }

    /// The relative identifier, i.e. the last sub-authority.
    pub fn rid(&self) -> Option<u32> {
        self.sub_authorities.last().copied()
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-", self.revision)?;
        // authorities that do not fit in 32 bits are written in hex
        if self.authority >> 32 == 0 {
            write!(f, "{}", self.authority)?;
        } else {
            write!(f, "0x{:012X}", self.authority)?;
        }
        for sub in &self.sub_authorities {
            write!(f, "-{sub}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nt_authority_sid() {
        let bytes = [
            1, 2, 0, 0, 0, 0, 0, 5, // header, authority 5
            21, 0, 0, 0, // 21
            0xf4, 0x01, 0, 0, // 500
        ];
        let sid = Sid::from_bytes(&bytes).unwrap();
        assert_eq!(sid.to_string(), "S-1-5-21-500");
        assert_eq!(sid.rid(), Some(500));
    }

    #[test]
    fn domain_sid_round_trips_through_bytes() {
        let sid = Sid::new(5, &[21, 3623811015, 3361044348, 30300820, 1013]).unwrap();
        let parsed = Sid::from_bytes(&sid.to_bytes()).unwrap();
        assert_eq!(parsed, sid);
        assert_eq!(
            parsed.to_string(),
            "S-1-5-21-3623811015-3361044348-30300820-1013"
        );
    }

    #[test]
    fn wide_authority_is_hex() {
        let sid = Sid::new(0x0102_0304_0506, &[7]).unwrap();
        assert_eq!(sid.to_string(), "S-1-0x010203040506-7");
    }

    #[test]
    fn rejects_malformed_buffers() {
        assert_eq!(Sid::from_bytes(&[1, 0, 0]), Err(SidError::TooShort(3)));
        assert_eq!(
            Sid::from_bytes(&[2, 0, 0, 0, 0, 0, 0, 5]),
            Err(SidError::Revision(2))
        );
        assert_eq!(
            Sid::from_bytes(&[1, 16, 0, 0, 0, 0, 0, 5]),
            Err(SidError::TooManySubAuthorities(16))
        );
        assert_eq!(
            Sid::from_bytes(&[1, 1, 0, 0, 0, 0, 0, 5, 1, 0]),
            Err(SidError::Length {
                expected: 12,
                actual: 10
            })
        );
    }

    #[test]
    fn construction_caps_the_sub_authority_count() {
        let full = Sid::new(5, &[7; MAX_SUB_AUTHORITIES]).unwrap();
        let bytes = full.to_bytes();
        assert_eq!(bytes[1] as usize, MAX_SUB_AUTHORITIES);
        assert_eq!(Sid::from_bytes(&bytes).unwrap(), full);
        assert_eq!(
            Sid::new(5, &[7; 256]),
            Err(SidError::TooManySubAuthorities(256))
        );
        assert_eq!(
            Sid::new(1 << 48, &[7]),
            Err(SidError::AuthorityTooWide(1 << 48))
        );
    }

    #[test]
    fn null_sid_has_no_sub_authorities() {
        let sid = Sid::from_bytes(&[1, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(sid.to_string(), "S-1-0");
        assert_eq!(sid.rid(), None);
    }
}
