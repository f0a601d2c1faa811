use crate::store::Record;
use serde::{Deserialize, Serialize};

/// Attachment metadata embedded in an anchor's description, one
/// `key: value` pair per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentFields {
    pub attached_molecule: Option<String>,
    pub attached_at: Option<String>,
    pub attached_args: Option<String>,
}

impl AttachmentFields {
    /// The attached unit id, if one is declared.
    pub fn unit_id(&self) -> Option<&str> {
        self.attached_molecule.as_deref()
    }
}

/// Normalise `Attached-Molecule`, `attached molecule` and friends to
/// `attached_molecule`.
fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Parse attachment fields from a description. Returns `None` when no
/// attachment field carries a value.
pub fn parse_attachment_fields(description: &str) -> Option<AttachmentFields> {
    let mut fields = AttachmentFields::default();
    let mut found = false;

    for line in description.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let slot = match normalize_key(key).as_str() {
            "attached_molecule" => &mut fields.attached_molecule,
            "attached_at" => &mut fields.attached_at,
            "attached_args" => &mut fields.attached_args,
            _ => continue,
        };
        *slot = Some(value.to_string());
        found = true;
    }

    found.then_some(fields)
}

/// The attached unit id an anchor record points at, if any.
pub fn attached_unit(record: &Record) -> Option<String> {
    record
        .description
        .as_deref()
        .and_then(parse_attachment_fields)
        .and_then(|f| f.attached_molecule)
}
