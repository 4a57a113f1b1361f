//! vCard 3.0 export.

use crate::types::Contact;

/// Serialize contacts to vCard 3.0 text, one card per contact in input
/// order, joined by `\n`.
///
/// Field values are written verbatim. A name containing `:` or a newline
/// produces a malformed card.
pub fn export(contacts: &[Contact]) -> String {
    contacts
        .iter()
        .map(card)
        .collect::<Vec<_>>()
        .join("\n")
}

fn card(contact: &Contact) -> String {
    let plus = if contact.phone.starts_with('+') { "" } else { "+" };
    format!(
        "BEGIN:VCARD\nVERSION:3.0\nFN:{}\nTEL;TYPE=CELL:{}{}\nEND:VCARD",
        contact.name, plus, contact.phone
    )
}
