//! `mdblock render` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use mdblock_config::{CliSettings, Config};
use mdblock_element::{
    AmmoniaSanitizer, ContentSource, ElementRuntime, HLINKS_ATTR, HMIN_ATTR, HostElement,
    MarkdownBlockElement, MarkdownSpanElement, SRC_ATTR, UNTRUSTED_ATTR, UreqFetcher,
};
use mdblock_renderer::{EngineOptions, ParsingEngine, PulldownEngine};
use url::Url;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: stdin, or nothing when --src is given).
    file: Option<PathBuf>,

    /// Load markdown from this URL, resolved against the base URL.
    #[arg(long, conflicts_with = "inline")]
    src: Option<String>,

    /// Render inline markdown only (md-span).
    #[arg(long)]
    inline: bool,

    /// Minimum heading level (overrides config).
    #[arg(long)]
    hmin: Option<u32>,

    /// Heading link symbol; without a value the heading text becomes the link.
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    hlinks: Option<String>,

    /// Sanitize rendered HTML.
    #[arg(long)]
    untrusted: bool,

    /// Disable tables, strikethrough and task lists.
    #[arg(long)]
    no_gfm: bool,

    /// Fetch timeout in seconds (overrides config).
    #[arg(long)]
    timeout: Option<u64>,

    /// Base URL for relative --src values (default: current directory).
    #[arg(long, env = "MDBLOCK_BASE_URL")]
    base_url: Option<String>,

    /// Path to configuration file (default: auto-discover mdblock.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input, rendering or the fetch fails.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            hmin: self.hmin,
            hlinks: self.hlinks,
            untrusted: self.untrusted.then_some(true),
            gfm: self.no_gfm.then_some(false),
            timeout_secs: self.timeout,
            base_url: self.base_url,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let markup = match (&self.file, &self.src) {
            (Some(path), _) => std::fs::read_to_string(path)?,
            (None, Some(_)) => String::new(),
            (None, None) => std::io::read_to_string(std::io::stdin())?,
        };
        let base_url = base_url(&config)?;

        let html = render(&config, base_url, markup, self.src, self.inline).await?;
        output.html(&html)?;
        Ok(())
    }
}

/// Configured base URL, or the current directory as a `file://` URL.
fn base_url(config: &Config) -> Result<Url, CliError> {
    if let Some(url) = config.fetch.base_url()? {
        return Ok(url);
    }
    let cwd = std::env::current_dir()?;
    Url::from_directory_path(&cwd).map_err(|()| {
        CliError::Validation(format!("{} cannot be used as a base URL", cwd.display()))
    })
}

/// HTTP/file fetcher honoring the configured timeout and input size limit.
fn fetcher(config: &Config) -> UreqFetcher {
    let fetcher = UreqFetcher::new(config.fetch.timeout());
    match config.parser.max_input_bytes {
        Some(limit) => fetcher.with_body_limit(u64::try_from(limit).unwrap_or(u64::MAX)),
        None => fetcher,
    }
}

/// Render `markup` (or the document at `src`) through an element.
async fn render(
    config: &Config,
    base_url: Url,
    markup: String,
    src: Option<String>,
    inline: bool,
) -> Result<String, CliError> {
    let engine: Arc<dyn ParsingEngine> = Arc::new(PulldownEngine::with_options(EngineOptions {
        gfm: config.parser.gfm,
        max_input_bytes: config.parser.max_input_bytes,
    }));
    let sanitizer = Arc::new(AmmoniaSanitizer);

    let mut host = HostElement::new(base_url).with_inner_html(markup);
    if config.render.untrusted {
        host = host.with_attribute(UNTRUSTED_ATTR, "");
    }

    if inline {
        let mut span = MarkdownSpanElement::with_parts(host, engine, sanitizer);
        span.attach().await?;
        return Ok(span.element().host().inner_html().to_owned());
    }

    host = host.with_attribute(HMIN_ATTR, config.render.hmin.to_string());
    if let Some(symbol) = &config.render.hlinks {
        host = host.with_attribute(HLINKS_ATTR, symbol.clone());
    }
    if let Some(src) = &src {
        host = host.with_attribute(SRC_ATTR, src.clone());
    }

    let block = MarkdownBlockElement::with_parts(host, engine, sanitizer);
    let mut runtime = ElementRuntime::new(block, fetcher(config));
    runtime.attach().await?;
    runtime.run_until_idle().await?;
    let block = runtime.into_element();

    if let Some(src) = src {
        let Some(url) = block.src() else {
            return Err(CliError::Validation(format!("invalid src `{src}`")));
        };
        let loaded = block.element().content().and_then(ContentSource::source_url) == Some(url);
        if !loaded {
            return Err(CliError::Fetch(url.to_string()));
        }
        tracing::info!(%url, "Rendered remote document");
    }

    Ok(block.element().host().inner_html().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdblock_element::DEFAULT_BODY_LIMIT;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://example.com/docs/").unwrap()
    }

    #[tokio::test]
    async fn test_render_local_markup() {
        let html = render(
            &Config::default(),
            base(),
            "\n    # Title\n\n    Hello *world*\n".to_owned(),
            None,
            false,
        )
        .await
        .unwrap();
        assert_eq!(html, r#"<h1 id="title">Title</h1><p>Hello <em>world</em></p>"#);
    }

    #[tokio::test]
    async fn test_render_applies_heading_config() {
        let mut config = Config::default();
        config.render.hmin = 2;
        config.render.hlinks = Some("#".to_owned());

        let html = render(&config, base(), "# A".to_owned(), None, false)
            .await
            .unwrap();
        assert_eq!(
            html,
            r##"<h2 id="a"><a href="#a" class="anchor">#</a>A</h2>"##
        );
    }

    #[tokio::test]
    async fn test_render_inline() {
        let html = render(
            &Config::default(),
            base(),
            "# *a* and `b`".to_owned(),
            None,
            true,
        )
        .await
        .unwrap();
        assert_eq!(html, "# <em>a</em> and <code>b</code>");
    }

    #[tokio::test]
    async fn test_render_untrusted_strips_script() {
        let mut config = Config::default();
        config.render.untrusted = true;

        let html = render(
            &config,
            base(),
            "<script>alert(1)</script>\n\nok\n".to_owned(),
            None,
            false,
        )
        .await
        .unwrap();
        assert!(!html.contains("script"));
        assert!(html.contains("<p>ok</p>"));
    }

    #[tokio::test]
    async fn test_render_src_from_file_url() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc.md"), "# Remote\n").unwrap();
        let base = Url::from_directory_path(dir.path()).unwrap();

        let html = render(
            &Config::default(),
            base,
            String::new(),
            Some("doc.md".to_owned()),
            false,
        )
        .await
        .unwrap();
        assert_eq!(html, r#"<h1 id="remote">Remote</h1>"#);
    }

    #[tokio::test]
    async fn test_render_missing_src_fails() {
        let dir = tempfile::tempdir().unwrap();
        let base = Url::from_directory_path(dir.path()).unwrap();

        let result = render(
            &Config::default(),
            base,
            String::new(),
            Some("missing.md".to_owned()),
            false,
        )
        .await;
        assert!(matches!(result, Err(CliError::Fetch(url)) if url.ends_with("/missing.md")));
    }

    #[tokio::test]
    async fn test_render_invalid_src_fails() {
        let result = render(
            &Config::default(),
            base(),
            String::new(),
            Some("not a url!!".to_owned()),
            false,
        )
        .await;
        assert!(matches!(result, Err(CliError::Validation(_))));
    }

    #[test]
    fn test_fetcher_body_limit_follows_max_input_bytes() {
        let mut config = Config::default();
        assert_eq!(fetcher(&config).body_limit(), DEFAULT_BODY_LIMIT);
        config.parser.max_input_bytes = Some(2048);
        assert_eq!(fetcher(&config).body_limit(), 2048);
    }

    #[tokio::test]
    async fn test_render_src_over_limit_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc.md"), "# Too long\n").unwrap();
        let base = Url::from_directory_path(dir.path()).unwrap();
        let mut config = Config::default();
        config.parser.max_input_bytes = Some(4);

        let result = render(&config, base, String::new(), Some("doc.md".to_owned()), false).await;
        assert!(matches!(result, Err(CliError::Fetch(_))));
    }

    #[test]
    fn test_base_url_from_config() {
        let mut config = Config::default();
        config.fetch.base_url = Some("https://example.com/md/".to_owned());
        assert_eq!(
            base_url(&config).unwrap().as_str(),
            "https://example.com/md/"
        );
    }

    #[test]
    fn test_base_url_defaults_to_cwd() {
        let url = base_url(&Config::default()).unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with('/'));
    }
}
