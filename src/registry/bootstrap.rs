//! One-off seeding of the registry from the hand-written listing pages.

use std::path::Path;

use regex::Regex;

use super::models::{Category, Registry, Subject};

const ANCHOR_PATTERN: &str = r#"(?i)<a[^>]*href="([^"]+)"[^>]*>([^<]+)</a>"#;

/// Build a registry from each category's listing page.
///
/// Best-effort: a page that is missing or has no matching list contributes
/// an empty category.
pub async fn scan_listing_pages(site_dir: &Path) -> Registry {
    let mut registry = Registry::default();

    for category in Category::ALL {
        let path = site_dir.join(category.listing_page());
        match tokio::fs::read_to_string(&path).await {
            Ok(html) => {
                *registry.subjects_mut(category) = extract_subjects(&html, category.container_id());
            }
            Err(e) => {
                tracing::warn!(
                    page = %path.display(),
                    error = %e,
                    "Could not read listing page to bootstrap subjects"
                );
            }
        }
    }

    registry
}

/// Pull `(text, href)` pairs out of the `<ul id="container_id">` block.
pub fn extract_subjects(html: &str, container_id: &str) -> Vec<Subject> {
    let list_pattern = format!(
        r#"(?is)<ul[^>]*id="{}".*?</ul>"#,
        regex::escape(container_id)
    );
    let (Ok(list_re), Ok(anchor_re)) = (Regex::new(&list_pattern), Regex::new(ANCHOR_PATTERN))
    else {
        return Vec::new();
    };

    let Some(list) = list_re.find(html) else {
        return Vec::new();
    };

    anchor_re
        .captures_iter(list.as_str())
        .map(|caps| Subject {
            title: caps[2].trim().to_string(),
            filename: caps[1].trim().to_string(),
            pdf: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"
<html><body>
  <ul id="other"><li><a href="nope.html">Nope</a></li></ul>
  <UL class="subjects" id="main-subjects-list">
    <li><a href="networks.html">Networks</a></li>
    <li><a class="link" href="os.html" target="_blank"> Operating Systems </a></li>
  </UL>
</body></html>"#;

    #[test]
    fn extracts_anchors_inside_the_named_list_only() {
        let subjects = extract_subjects(INDEX, "main-subjects-list");
        assert_eq!(
            subjects,
            vec![
                Subject {
                    title: "Networks".to_string(),
                    filename: "networks.html".to_string(),
                    pdf: None,
                },
                Subject {
                    title: "Operating Systems".to_string(),
                    filename: "os.html".to_string(),
                    pdf: None,
                },
            ]
        );
    }

    #[test]
    fn missing_container_yields_nothing() {
        assert!(extract_subjects(INDEX, "cyber-subjects").is_empty());
        assert!(extract_subjects("not html at all", "main-subjects-list").is_empty());
    }

    #[tokio::test]
    async fn scan_tolerates_missing_pages() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("index.html"), INDEX)
            .await
            .unwrap();

        let registry = scan_listing_pages(dir.path()).await;
        assert_eq!(registry.main.len(), 2);
        assert!(registry.data_science.is_empty());
        assert!(registry.cyber.is_empty());
    }
}
