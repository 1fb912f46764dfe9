//! Static map from logical attributes to the directory schema's physical
//! column names.
//!
//! Physical names have the form `ATT<syntax><attid>`, e.g. `ATTr589970` is
//! attribute id 589970 (objectSid) stored with SID syntax. The table is tied to
//! the schema revision of Active Directory databases; other families will fail
//! catalog resolution with a schema mismatch.
use crate::attribute::{Attribute, AttributeSelection};
use crate::decode::DecodeRule;
use crate::error::{EseError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub attribute: Attribute,
    pub column: &'static str,
    /// `None` for attributes that are enumerated but not decodable, such as
    /// multi-valued history blobs.
    pub rule: Option<DecodeRule>,
}

const fn entry(attribute: Attribute, column: &'static str, rule: Option<DecodeRule>) -> RegistryEntry {
    RegistryEntry {
        attribute,
        column,
        rule,
    }
}

/// Declaration order here is the order attributes appear in decoded rows.
pub static REGISTRY: [RegistryEntry; 20] = [
    entry(Attribute::ObjectSid, "ATTr589970", Some(DecodeRule::Sid)),
    entry(Attribute::SamAccountName, "ATTm590045", Some(DecodeRule::Utf16)),
    entry(Attribute::SamAccountType, "ATTj590126", Some(DecodeRule::U32)),
    entry(Attribute::UserPrincipalName, "ATTm590480", Some(DecodeRule::Utf16)),
    entry(Attribute::UserAccountControl, "ATTj589832", Some(DecodeRule::U32)),
    entry(Attribute::LastLogon, "ATTq589876", Some(DecodeRule::FileTime)),
    entry(Attribute::LastLogonTimestamp, "ATTq591520", Some(DecodeRule::FileTime)),
    entry(Attribute::AccountExpires, "ATTq589983", Some(DecodeRule::FileTime)),
    entry(Attribute::PwdLastSet, "ATTq589920", Some(DecodeRule::FileTime)),
    entry(Attribute::BadPasswordTime, "ATTq589873", Some(DecodeRule::FileTime)),
    entry(Attribute::LogonCount, "ATTj589993", Some(DecodeRule::U32)),
    entry(Attribute::BadPwdCount, "ATTj589836", Some(DecodeRule::U32)),
    entry(Attribute::PrimaryGroupId, "ATTj589922", Some(DecodeRule::U32)),
    // Encrypted blobs, not integers: strict width makes real values surface
    // as decode errors instead of a truncated number.
    entry(Attribute::EncryptedNtHash, "ATTk589914", Some(DecodeRule::U32)),
    entry(Attribute::EncryptedLmHash, "ATTk589879", Some(DecodeRule::U32)),
    entry(Attribute::EncryptedNtHashHistory, "ATTk589918", None),
    entry(Attribute::EncryptedLmHashHistory, "ATTk589984", None),
    entry(Attribute::UnixPassword, "ATTk591734", None),
    entry(Attribute::AdUserObjects, "ATTk36", None),
    entry(Attribute::SupplementalCredentials, "ATTk589949", None),
];

pub fn entry_for(attribute: Attribute) -> &'static RegistryEntry {
    // REGISTRY is declared in Attribute::ALL order
    &REGISTRY[attribute as usize]
}

/// Physical column name for `attribute`.
pub fn resolve(attribute: Attribute) -> &'static str {
    entry_for(attribute).column
}

/// Selected entries in declaration order.
pub fn resolve_all(selection: AttributeSelection) -> Vec<&'static RegistryEntry> {
    selection.attributes().map(entry_for).collect()
}

/// Like [`resolve_all`], but rejects empty selections and attributes that
/// have no decode rule.
pub fn decodable(selection: AttributeSelection) -> Result<Vec<(&'static RegistryEntry, DecodeRule)>> {
    if selection.is_empty() {
        return Err(EseError::EmptySelection);
    }
    resolve_all(selection)
        .into_iter()
        .map(|e| match e.rule {
            Some(rule) => Ok((e, rule)),
            None => Err(EseError::UndecodableAttribute(e.attribute)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Syntax letter and attribute id of an `ATT<syntax><attid>` name.
    fn split_physical(name: &str) -> Option<(char, u32)> {
        let rest = name.strip_prefix("ATT")?;
        let syntax = rest.chars().next().filter(char::is_ascii_lowercase)?;
        let id = rest[1..].parse().ok()?;
        Some((syntax, id))
    }

    #[test]
    fn registry_follows_attribute_declaration_order() {
        for (i, a) in Attribute::ALL.iter().enumerate() {
            assert_eq!(REGISTRY[i].attribute, *a);
            assert_eq!(entry_for(*a).attribute, *a);
        }
    }

    #[test]
    fn every_column_name_is_a_well_formed_attribute_column() {
        for e in &REGISTRY {
            let (syntax, id) = split_physical(e.column).unwrap_or_else(|| panic!("{}", e.column));
            assert_eq!(format!("ATT{syntax}{id}"), e.column);
        }
        assert_eq!(split_physical("DNT_col"), None);
        assert_eq!(split_physical("ATT589970"), None);
    }

    #[test]
    fn decode_rules_agree_with_column_syntax() {
        for e in REGISTRY.iter().filter(|e| e.rule.is_some()) {
            let (syntax, _) = split_physical(e.column).unwrap();
            let allowed: &[char] = match e.rule.unwrap() {
                DecodeRule::Sid => &['r'],
                DecodeRule::Utf16 => &['m'],
                DecodeRule::FileTime => &['q'],
                // integers, plus the encrypted hash blobs
                DecodeRule::U32 => &['j', 'k'],
            };
            assert!(allowed.contains(&syntax), "{}", e.attribute);
        }
    }

    #[test]
    fn resolves_known_columns() {
        assert_eq!(resolve(Attribute::ObjectSid), "ATTr589970");
        assert_eq!(resolve(Attribute::SamAccountName), "ATTm590045");
        assert_eq!(resolve(Attribute::EncryptedNtHash), "ATTk589914");
        let cols: Vec<_> = resolve_all(Attribute::UserAccountControl | Attribute::ObjectSid)
            .into_iter()
            .map(|e| e.column)
            .collect();
        assert_eq!(cols, vec!["ATTr589970", "ATTj589832"]);
    }

    #[test]
    fn rejects_undecodable_and_empty_selections() {
        let err = decodable(Attribute::ObjectSid | Attribute::EncryptedNtHashHistory).unwrap_err();
        assert!(matches!(
            err,
            EseError::UndecodableAttribute(Attribute::EncryptedNtHashHistory)
        ));
        assert!(matches!(
            decodable(AttributeSelection::empty()),
            Err(EseError::EmptySelection)
        ));
        assert_eq!(decodable(AttributeSelection::OBJECT_SID).unwrap().len(), 1);
    }
}
