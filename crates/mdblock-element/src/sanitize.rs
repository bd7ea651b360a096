//! HTML sanitization for untrusted content.

use std::future::Future;

use ammonia::Builder;
use tokio::sync::OnceCell;

use crate::error::SanitizeError;

/// Removes unsafe markup from rendered HTML.
///
/// Implementations must be side-effect free and idempotent.
pub trait Sanitizer: Send + Sync + 'static {
    /// Sanitize `html`.
    ///
    /// # Errors
    ///
    /// Returns [`SanitizeError`] if the sanitizer cannot be initialized.
    fn sanitize(&self, html: &str) -> impl Future<Output = Result<String, SanitizeError>> + Send;
}

/// Process-wide sanitizer policy, built on first use.
static POLICY: OnceCell<Builder<'static>> = OnceCell::const_new();

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// [`Sanitizer`] backed by `ammonia`.
///
/// The policy is ammonia's default whitelist plus what rendered markdown
/// needs: heading ids, anchor/code classes and disabled task list checkboxes.
/// Concurrent first calls share one initialization.
#[derive(Clone, Copy, Debug, Default)]
pub struct AmmoniaSanitizer;

impl AmmoniaSanitizer {
    async fn policy() -> &'static Builder<'static> {
        POLICY
            .get_or_init(|| async {
                tracing::debug!("Initializing sanitizer policy");
                build_policy()
            })
            .await
    }
}

impl Sanitizer for AmmoniaSanitizer {
    async fn sanitize(&self, html: &str) -> Result<String, SanitizeError> {
        let policy = Self::policy().await;
        Ok(policy.clean(html).to_string())
    }
}

fn build_policy() -> Builder<'static> {
    let mut builder = Builder::default();
    for tag in HEADING_TAGS {
        builder.add_tag_attributes(tag, &["id"]);
    }
    builder
        .add_tag_attributes("a", &["class"])
        .add_tag_attributes("pre", &["class"])
        .add_tag_attributes("code", &["class"])
        .add_tags(&["input"])
        .add_tag_attributes("input", &["type", "checked", "disabled"]);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_strips_scripts_and_handlers() {
        let html = r#"<p onclick="x()">Hi</p><script>alert(1)</script>"#;
        let clean = AmmoniaSanitizer.sanitize(html).await.unwrap();
        assert_eq!(clean, "<p>Hi</p>");
    }

    #[tokio::test]
    async fn test_keeps_heading_ids_and_anchor_class() {
        let html = r##"<h2 id="usage"><a href="#usage" class="anchor">#</a>Usage</h2>"##;
        let clean = AmmoniaSanitizer.sanitize(html).await.unwrap();
        assert!(clean.contains(r#"<h2 id="usage">"#), "{clean}");
        assert!(clean.contains(r#"class="anchor""#), "{clean}");
        assert!(clean.contains(r##"href="#usage""##), "{clean}");
    }

    #[tokio::test]
    async fn test_keeps_code_language_class() {
        let html = r#"<pre class="language-rust"><code>fn main() {}</code></pre>"#;
        let clean = AmmoniaSanitizer.sanitize(html).await.unwrap();
        assert_eq!(clean, html);
    }

    #[tokio::test]
    async fn test_is_idempotent() {
        let html = r#"<p>a <img src="x.png" onerror="y()"> <em>b</em></p>"#;
        let once = AmmoniaSanitizer.sanitize(html).await.unwrap();
        let twice = AmmoniaSanitizer.sanitize(&once).await.unwrap();
        assert_eq!(once, twice);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_use() {
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                tokio::spawn(async move {
                    AmmoniaSanitizer
                        .sanitize(&format!("<b>{i}</b><script></script>"))
                        .await
                })
            })
            .collect();
        for (i, task) in tasks.into_iter().enumerate() {
            assert_eq!(task.await.unwrap().unwrap(), format!("<b>{i}</b>"));
        }
    }
}
