//! Logical directory attributes and the set type callers use to request them.
//!
//! An [`AttributeSelection`] is a bitmask over [`Attribute`] values. Iterating
//! a selection always yields attributes in declaration order, so two requests
//! for the same attributes produce identically ordered rows regardless of how
//! the caller combined the flags.
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

/// A logical attribute of a directory object, independent of the physical
/// column that stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    ObjectSid,
    SamAccountName,
    SamAccountType,
    UserPrincipalName,
    UserAccountControl,
    LastLogon,
    LastLogonTimestamp,
    AccountExpires,
    PwdLastSet,
    BadPasswordTime,
    LogonCount,
    BadPwdCount,
    PrimaryGroupId,
    EncryptedNtHash,
    EncryptedLmHash,
    EncryptedNtHashHistory,
    EncryptedLmHashHistory,
    UnixPassword,
    AdUserObjects,
    SupplementalCredentials,
}

impl Attribute {
    /// Every attribute, in declaration order.
    pub const ALL: [Attribute; 20] = [
        Attribute::ObjectSid,
        Attribute::SamAccountName,
        Attribute::SamAccountType,
        Attribute::UserPrincipalName,
        Attribute::UserAccountControl,
        Attribute::LastLogon,
        Attribute::LastLogonTimestamp,
        Attribute::AccountExpires,
        Attribute::PwdLastSet,
        Attribute::BadPasswordTime,
        Attribute::LogonCount,
        Attribute::BadPwdCount,
        Attribute::PrimaryGroupId,
        Attribute::EncryptedNtHash,
        Attribute::EncryptedLmHash,
        Attribute::EncryptedNtHashHistory,
        Attribute::EncryptedLmHashHistory,
        Attribute::UnixPassword,
        Attribute::AdUserObjects,
        Attribute::SupplementalCredentials,
    ];

    /// Name used as the key in decoded rows.
    pub fn display_name(self) -> &'static str {
        match self {
            Attribute::ObjectSid => "objectSid",
            Attribute::SamAccountName => "sAMAccountName",
            Attribute::SamAccountType => "sAMAccountType",
            Attribute::UserPrincipalName => "userPrincipalName",
            Attribute::UserAccountControl => "userAccountControl",
            Attribute::LastLogon => "lastLogon",
            Attribute::LastLogonTimestamp => "lastLogonTimestamp",
            Attribute::AccountExpires => "accountExpires",
            Attribute::PwdLastSet => "pwdLastSet",
            Attribute::BadPasswordTime => "badPasswordTime",
            Attribute::LogonCount => "logonCount",
            Attribute::BadPwdCount => "badPwdCount",
            Attribute::PrimaryGroupId => "primaryGroupID",
            Attribute::EncryptedNtHash => "EncryptedNTHash",
            Attribute::EncryptedLmHash => "EncryptedLMHash",
            Attribute::EncryptedNtHashHistory => "EncryptedNTHashHistory",
            Attribute::EncryptedLmHashHistory => "EncryptedLMHashHistory",
            Attribute::UnixPassword => "unixPassword",
            Attribute::AdUserObjects => "ADUserObjects",
            Attribute::SupplementalCredentials => "supplementCredentials",
        }
    }

    /// The single-bit selection for this attribute.
    pub fn flag(self) -> AttributeSelection {
        match self {
            Attribute::ObjectSid => AttributeSelection::OBJECT_SID,
            Attribute::SamAccountName => AttributeSelection::SAM_ACCOUNT_NAME,
            Attribute::SamAccountType => AttributeSelection::SAM_ACCOUNT_TYPE,
            Attribute::UserPrincipalName => AttributeSelection::USER_PRINCIPAL_NAME,
            Attribute::UserAccountControl => AttributeSelection::USER_ACCOUNT_CONTROL,
            Attribute::LastLogon => AttributeSelection::LAST_LOGON,
            Attribute::LastLogonTimestamp => AttributeSelection::LAST_LOGON_TIMESTAMP,
            Attribute::AccountExpires => AttributeSelection::ACCOUNT_EXPIRES,
            Attribute::PwdLastSet => AttributeSelection::PWD_LAST_SET,
            Attribute::BadPasswordTime => AttributeSelection::BAD_PASSWORD_TIME,
            Attribute::LogonCount => AttributeSelection::LOGON_COUNT,
            Attribute::BadPwdCount => AttributeSelection::BAD_PWD_COUNT,
            Attribute::PrimaryGroupId => AttributeSelection::PRIMARY_GROUP_ID,
            Attribute::EncryptedNtHash => AttributeSelection::ENCRYPTED_NT_HASH,
            Attribute::EncryptedLmHash => AttributeSelection::ENCRYPTED_LM_HASH,
            Attribute::EncryptedNtHashHistory => AttributeSelection::ENCRYPTED_NT_HASH_HISTORY,
            Attribute::EncryptedLmHashHistory => AttributeSelection::ENCRYPTED_LM_HASH_HISTORY,
            Attribute::UnixPassword => AttributeSelection::UNIX_PASSWORD,
            Attribute::AdUserObjects => AttributeSelection::AD_USER_OBJECTS,
            Attribute::SupplementalCredentials => AttributeSelection::SUPPLEMENTAL_CREDENTIALS,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown attribute name: {0}")]
pub struct UnknownAttribute(pub String);

impl FromStr for Attribute {
    type Err = UnknownAttribute;

    /// Display names are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Attribute::ALL
            .iter()
            .copied()
            .find(|a| a.display_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownAttribute(name.to_string()))
    }
}

bitflags::bitflags! {
    /// A set of requested attributes. Bit values match the directory tooling
    /// convention so raw masks from other tools can be passed through
    /// [`AttributeSelection::from_bits`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttributeSelection: u32 {
        const OBJECT_SID = 0x00001;
        const SAM_ACCOUNT_NAME = 0x00002;
        const SAM_ACCOUNT_TYPE = 0x00004;
        const USER_PRINCIPAL_NAME = 0x00008;
        const USER_ACCOUNT_CONTROL = 0x00010;
        const LAST_LOGON = 0x00020;
        const LAST_LOGON_TIMESTAMP = 0x00040;
        const ACCOUNT_EXPIRES = 0x00080;
        const PWD_LAST_SET = 0x00100;
        const BAD_PASSWORD_TIME = 0x00200;
        const LOGON_COUNT = 0x00400;
        const BAD_PWD_COUNT = 0x00800;
        const PRIMARY_GROUP_ID = 0x01000;
        const ENCRYPTED_NT_HASH = 0x02000;
        const ENCRYPTED_LM_HASH = 0x04000;
        const ENCRYPTED_NT_HASH_HISTORY = 0x08000;
        const ENCRYPTED_LM_HASH_HISTORY = 0x10000;
        const UNIX_PASSWORD = 0x20000;
        const AD_USER_OBJECTS = 0x40000;
        const SUPPLEMENTAL_CREDENTIALS = 0x80000;
    }
}

impl AttributeSelection {
    /// Iterate the selected attributes in declaration order.
    pub fn attributes(self) -> impl Iterator<Item = Attribute> {
        Attribute::ALL
            .into_iter()
            .filter(move |a| self.contains(a.flag()))
    }

    /// Whether `attribute` is part of this selection.
    pub fn includes(self, attribute: Attribute) -> bool {
        self.contains(attribute.flag())
    }

    /// Parse a comma separated list of display names, e.g.
    /// `"objectSid, sAMAccountName"`.
    pub fn parse_names(list: &str) -> Result<Self, UnknownAttribute> {
        let mut selection = AttributeSelection::empty();
        for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            selection |= name.parse::<Attribute>()?.flag();
        }
        Ok(selection)
    }
}

impl From<Attribute> for AttributeSelection {
    fn from(attribute: Attribute) -> Self {
        attribute.flag()
    }
}

impl FromIterator<Attribute> for AttributeSelection {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        iter.into_iter()
            .fold(AttributeSelection::empty(), |acc, a| acc | a.flag())
    }
}

impl BitOr for Attribute {
    type Output = AttributeSelection;

    fn bitor(self, rhs: Attribute) -> AttributeSelection {
        self.flag() | rhs.flag()
    }
}

impl BitOr<Attribute> for AttributeSelection {
    type Output = AttributeSelection;

    fn bitor(self, rhs: Attribute) -> AttributeSelection {
        self | rhs.flag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_follows_declaration_order_not_input_order() {
        let a = Attribute::UserAccountControl | Attribute::ObjectSid | Attribute::SamAccountName;
        let b = Attribute::SamAccountName | Attribute::UserAccountControl | Attribute::ObjectSid;
        let order_a: Vec<_> = a.attributes().collect();
        let order_b: Vec<_> = b.attributes().collect();
        assert_eq!(order_a, order_b);
        assert_eq!(
            order_a,
            vec![
                Attribute::ObjectSid,
                Attribute::SamAccountName,
                Attribute::UserAccountControl
            ]
        );
    }

    #[test]
    fn every_attribute_has_a_distinct_single_bit() {
        let mut seen = AttributeSelection::empty();
        for a in Attribute::ALL {
            let flag = a.flag();
            assert_eq!(flag.bits().count_ones(), 1, "{a}");
            assert!(!seen.intersects(flag), "{a} overlaps");
            seen |= flag;
        }
        assert_eq!(seen, AttributeSelection::all());
    }

    #[test]
    fn raw_mask_round_trips_through_bits() {
        let sel = AttributeSelection::from_bits(0x02013).unwrap();
        assert!(sel.includes(Attribute::ObjectSid));
        assert!(sel.includes(Attribute::SamAccountName));
        assert!(sel.includes(Attribute::UserAccountControl));
        assert!(sel.includes(Attribute::EncryptedNtHash));
        assert_eq!(sel.attributes().count(), 4);
        assert!(AttributeSelection::from_bits(0x100000).is_none());
    }

    #[test]
    fn parses_display_names_case_insensitively() {
        let sel = AttributeSelection::parse_names(" objectsid ,SAMACCOUNTNAME,,").unwrap();
        assert_eq!(sel, Attribute::ObjectSid | Attribute::SamAccountName);
        assert_eq!("primaryGroupID".parse::<Attribute>().unwrap(), Attribute::PrimaryGroupId);
        assert!(AttributeSelection::parse_names("objectSid,nope").is_err());
    }

    #[test]
    fn collects_from_iterator() {
        let sel: AttributeSelection = [Attribute::LastLogon, Attribute::LogonCount]
            .into_iter()
            .collect();
        assert_eq!(sel.bits(), 0x00420);
    }
}
