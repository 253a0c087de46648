use crate::errors::AppError;
use crate::models::ContactCardRequest;
use std::path::PathBuf;

/// Assemble a VERSION:3.0 vCard for a registrant.
///
/// The EMAIL line is omitted when no email was captured. Campaign answers
/// (Discovery customer, Vitality, products, consent) travel in a single NOTE
/// line joined with `" | "` so broker phones show them on import.
pub fn build_vcard(req: &ContactCardRequest) -> String {
    let full_name = format!("{} {}", req.name, req.surname);
    let note_fields = [
        format!("Discovery Customer: {}", req.is_discovery_customer),
        format!("Has Vitality: {}", req.has_vitality),
        format!("Products: {}", req.products.join(", ")),
        format!("Consent given: {}", req.consent),
    ];

    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("N:{};{};;;", req.surname, req.name),
        format!("FN:{}", full_name),
    ];
    if let Some(ref email) = req.email {
        lines.push(format!("EMAIL;TYPE=INTERNET:{}", email));
    }
    lines.push(format!("TEL;TYPE=CELL:{}", req.mobile));
    lines.push(format!("X-PHONETYPE:{}", req.phone_type));
    lines.push(format!("NOTE:{}", note_fields.join(" | ")));
    lines.push("END:VCARD".to_string());

    lines.join("\r\n")
}

/// Reduce a name to a safe file stem: ASCII alphanumerics, `_` and `-` only.
pub fn sanitize_file_stem(raw: &str) -> String {
    let stem: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    if stem.is_empty() {
        "card".to_string()
    } else {
        stem
    }
}

/// vCard file name for a registrant: `{name}_{surname}.vcf`.
pub fn vcard_file_name(name: &str, surname: &str) -> String {
    format!(
        "{}_{}.vcf",
        sanitize_file_stem(name),
        sanitize_file_stem(surname)
    )
}

/// On-disk library of generated vCards.
///
/// Callers must hold the shared library mutex around these operations so a
/// concurrent empty cannot interleave with a write.
pub struct VcardLibrary {
    dir: PathBuf,
}

impl VcardLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write a card, creating the library directory on first use.
    pub async fn write_card(&self, file_name: &str, content: &str) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, content).await?;
        tracing::info!("Wrote vCard {}", path.display());
        Ok(())
    }

    /// Delete every file in the library, returning how many were removed.
    pub async fn empty(&self) -> Result<usize, AppError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            // Nothing to delete
            Err(_) => return Ok(0),
        };

        let mut deleted = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match tokio::fs::remove_file(&path).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::warn!("Failed to delete {}: {}", path.display(), e);
                }
            }
        }

        tracing::info!("Emptied vCard library ({} files)", deleted);
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: Option<&str>) -> ContactCardRequest {
        ContactCardRequest {
            name: "Thandi".to_string(),
            surname: "Mokoena".to_string(),
            email: email.map(String::from),
            mobile: "0823292438".to_string(),
            is_discovery_customer: true,
            has_vitality: false,
            products: vec!["Medical Aid".to_string(), "Life Cover".to_string()],
            consent: true,
            phone_type: "iphone".to_string(),
        }
    }

    #[test]
    fn vcard_has_exactly_one_begin_end_pair() {
        let card = build_vcard(&request(Some("thandi@example.com")));
        assert_eq!(card.matches("BEGIN:VCARD").count(), 1);
        assert_eq!(card.matches("END:VCARD").count(), 1);
        assert!(card.starts_with("BEGIN:VCARD\r\n"));
        assert!(card.ends_with("\r\nEND:VCARD"));
    }

    #[test]
    fn vcard_note_joins_four_fields_with_pipes() {
        let card = build_vcard(&request(Some("thandi@example.com")));
        let note = card
            .lines()
            .find(|l| l.starts_with("NOTE:"))
            .expect("NOTE line");
        assert_eq!(
            note,
            "NOTE:Discovery Customer: true | Has Vitality: false | \
             Products: Medical Aid, Life Cover | Consent given: true"
        );
        assert_eq!(note.matches(" | ").count(), 3);
    }

    #[test]
    fn vcard_omits_email_line_when_absent() {
        let with_email = build_vcard(&request(Some("thandi@example.com")));
        let without_email = build_vcard(&request(None));
        assert!(with_email.contains("EMAIL;TYPE=INTERNET:thandi@example.com"));
        assert!(!without_email.contains("EMAIL"));
    }

    #[test]
    fn vcard_name_and_tel_lines() {
        let card = build_vcard(&request(None));
        assert!(card.contains("N:Mokoena;Thandi;;;"));
        assert!(card.contains("FN:Thandi Mokoena"));
        assert!(card.contains("TEL;TYPE=CELL:0823292438"));
        assert!(card.contains("X-PHONETYPE:iphone"));
    }

    #[test]
    fn file_stem_is_sanitized() {
        assert_eq!(vcard_file_name("Thandi", "Mokoena"), "Thandi_Mokoena.vcf");
        assert_eq!(vcard_file_name("../etc", "pass wd"), "etc_passwd.vcf");
        assert_eq!(vcard_file_name("", ""), "card_card.vcf");
    }

    #[tokio::test]
    async fn library_write_then_empty() {
        let dir = tempfile::tempdir().unwrap();
        let library = VcardLibrary::new(dir.path());

        library.write_card("a_b.vcf", "BEGIN:VCARD").await.unwrap();
        library.write_card("c_d.vcf", "BEGIN:VCARD").await.unwrap();
        assert_eq!(library.empty().await.unwrap(), 2);
        assert_eq!(library.empty().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn emptying_missing_directory_deletes_nothing() {
        let library = VcardLibrary::new("/definitely/not/here");
        assert_eq!(library.empty().await.unwrap(), 0);
    }
}
