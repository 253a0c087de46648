use crate::errors::AppError;
use std::collections::BTreeMap;
use std::path::Path;

/// POPIA disclaimer appended to every campaign email.
pub const EMAIL_DISCLAIMER: &str = "This message and any attachments are intended only for the \
addressee and may contain confidential information. Your details were captured with your \
consent for this campaign and are processed in line with the Protection of Personal \
Information Act. If you received this message in error, please delete it and notify the \
sender. To opt out of further communication, reply with the word STOP.";

/// Read an email template from the configured templates directory.
pub async fn load_template(templates_dir: &str, file_name: &str) -> Result<String, AppError> {
    let path = Path::new(templates_dir).join(file_name);
    tokio::fs::read_to_string(&path).await.map_err(|e| {
        AppError::NotFound(format!(
            "Email template {} not found: {}",
            path.display(),
            e
        ))
    })
}

/// Replace every `{{key}}` placeholder in the template.
///
/// Injection must be complete: a leftover `{{` after substitution means a
/// placeholder had no value, which would leak template syntax into a customer
/// email, so it is an error.
pub fn render_template(
    template: &str,
    values: &BTreeMap<String, String>,
) -> Result<String, AppError> {
    let mut rendered = template.to_string();
    for (key, value) in values {
        rendered = rendered.replace(&format!("{{{{{}}}}}", key), value);
    }

    if rendered.contains("{{") || rendered.contains("}}") {
        return Err(AppError::Internal(
            "Placeholder injection incomplete".to_string(),
        ));
    }

    Ok(rendered)
}

/// Load every pre-encoded base64 asset (`*.txt`) from the assets directory.
///
/// Assets are images and icons stored as base64 text; the data URI must be a
/// single token, so all whitespace is stripped. Each `foo.txt` is registered
/// under the placeholder key `foo`. A missing directory yields no assets.
pub async fn load_base64_assets(assets_dir: &str) -> Result<BTreeMap<String, String>, AppError> {
    let mut assets = BTreeMap::new();

    let mut entries = match tokio::fs::read_dir(assets_dir).await {
        Ok(entries) => entries,
        Err(_) => {
            tracing::debug!("No base64 asset directory at {}", assets_dir);
            return Ok(assets);
        }
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to list assets: {}", e)))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let Some(key) = path.file_stem().and_then(|s| s.to_str()).map(String::from) else {
            continue;
        };
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read asset {}: {}", key, e)))?;
        let cleaned: String = raw.split_whitespace().collect();
        assets.insert(key, cleaned);
    }

    tracing::debug!("Loaded {} base64 assets from {}", assets.len(), assets_dir);
    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn renders_all_placeholders() {
        let out = render_template(
            "<p>{{header}}</p><div>{{body}}</div>",
            &values(&[("header", "Hello"), ("body", "World")]),
        )
        .unwrap();
        assert_eq!(out, "<p>Hello</p><div>World</div>");
    }

    #[test]
    fn repeated_placeholders_all_replaced() {
        let out = render_template("{{x}} and {{x}}", &values(&[("x", "y")])).unwrap();
        assert_eq!(out, "y and y");
    }

    #[test]
    fn leftover_placeholder_is_an_error() {
        let result = render_template("{{header}} {{missing}}", &values(&[("header", "h")]));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn assets_are_whitespace_stripped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("icon_user.txt"), "aGVs\nbG8g  d29y\tbGQ=").unwrap();
        std::fs::write(dir.path().join("readme.md"), "ignored").unwrap();

        let assets = load_base64_assets(dir.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets["icon_user"], "aGVsbG8gd29ybGQ=");
    }

    #[tokio::test]
    async fn missing_asset_dir_is_empty() {
        let assets = load_base64_assets("/definitely/not/here").await.unwrap();
        assert!(assets.is_empty());
    }
}
