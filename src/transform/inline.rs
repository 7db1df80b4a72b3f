//! Asset inliner (markup → self-contained markup).
//!
//! Rewrites local resource references in `src`/`href`/`poster`/`srcset` attributes
//! into base64 `data:` URIs so the converter never touches the filesystem
//! for them. References that cannot be read stay as they were.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use rustc_hash::FxHashMap;

use crate::utils::mime;
use crate::{debug, log};

/// Tags that reference an external resource. Quoted values may contain `>`.
static RESOURCE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<(?:img|image|source|input|link|video|embed)\b(?:[^>"']|"[^"]*"|'[^']*')*>"#)
        .unwrap()
});

/// Any `name=value` attribute inside a tag, quoted or bare.
///
/// Matching every attribute in order keeps a `src=` inside another
/// attribute's quoted value from being taken for a real one.
static TAG_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(?P<prefix>\s(?P<name>[a-z_:][a-z0-9_:.\-]*)\s*=\s*)(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s"'>]+))"#,
    )
    .unwrap()
});

/// Attributes holding a single resource URL.
const URL_ATTRS: &[&str] = &["src", "href", "xlink:href", "poster"];

/// `scheme:` prefix of an absolute URI (two characters minimum so that
/// Windows drive letters are not mistaken for schemes).
static URI_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]+:").unwrap());

/// Inline every readable local resource referenced by `markup`.
///
/// Local references are resolved against `base`. Markup without resource
/// tags is returned unchanged.
pub fn inline_assets(markup: &str, base: &Path) -> String {
    let mut inliner = Inliner::new(base);
    let out = RESOURCE_TAG.replace_all(markup, |tag: &Captures| inliner.rewrite_tag(&tag[0]));

    if inliner.inlined + inliner.skipped > 0 {
        debug!("inline"; "inlined {} reference(s), kept {}", inliner.inlined, inliner.skipped);
    }
    out.into_owned()
}

struct Inliner<'a> {
    base: &'a Path,
    /// Encoded payloads per relative path (`None` = unreadable).
    encoded: FxHashMap<String, Option<String>>,
    inlined: usize,
    skipped: usize,
}

impl<'a> Inliner<'a> {
    fn new(base: &'a Path) -> Self {
        Self {
            base,
            encoded: FxHashMap::default(),
            inlined: 0,
            skipped: 0,
        }
    }

    fn rewrite_tag(&mut self, tag: &str) -> String {
        TAG_ATTR
            .replace_all(tag, |attr: &Captures| {
                let name = attr["name"].to_ascii_lowercase();
                let (quote, value) = if let Some(v) = attr.name("dq") {
                    ('"', v.as_str())
                } else if let Some(v) = attr.name("sq") {
                    ('\'', v.as_str())
                } else {
                    // Bare values are re-quoted: a data URI may contain `=`.
                    ('"', attr.name("bare").map_or("", |v| v.as_str()))
                };

                let value = if name == "srcset" {
                    self.rewrite_srcset(value)
                } else if URL_ATTRS.contains(&name.as_str()) {
                    self.rewrite_reference(value)
                } else {
                    return attr[0].to_string();
                };
                format!("{}{quote}{value}{quote}", &attr["prefix"])
            })
            .into_owned()
    }

    /// Rewrite each `url [descriptor]` candidate of a `srcset` list.
    fn rewrite_srcset<'v>(&mut self, srcset: &'v str) -> Cow<'v, str> {
        // Commas inside data URIs would break the candidate split.
        if srcset.contains("data:") {
            return Cow::Borrowed(srcset);
        }

        let candidates: Vec<String> = srcset
            .split(',')
            .map(str::trim)
            .filter(|candidate| !candidate.is_empty())
            .map(|candidate| {
                let (url, descriptor) = candidate
                    .split_once(char::is_whitespace)
                    .map_or((candidate, ""), |(url, rest)| (url, rest.trim()));
                let url = self.rewrite_reference(url);
                if descriptor.is_empty() {
                    url.into_owned()
                } else {
                    format!("{url} {descriptor}")
                }
            })
            .collect();
        Cow::Owned(candidates.join(", "))
    }

    fn rewrite_reference<'v>(&mut self, reference: &'v str) -> Cow<'v, str> {
        let Some(relative) = local_reference(reference) else {
            return Cow::Borrowed(reference);
        };

        let base = self.base;
        let encoded = self
            .encoded
            .entry(relative.clone())
            .or_insert_with(|| encode_file(base, &relative));

        match encoded {
            Some(data_uri) => {
                self.inlined += 1;
                Cow::Owned(data_uri.clone())
            }
            None => {
                self.skipped += 1;
                Cow::Borrowed(reference)
            }
        }
    }
}

/// Normalize a reference to a path relative to the inlining base.
///
/// Returns `None` for references that are not local files: data URIs,
/// scheme-qualified and protocol-relative URLs, fragments.
fn local_reference(reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty()
        || reference.starts_with('#')
        || reference.starts_with("//")
        || URI_SCHEME.is_match(reference)
    {
        return None;
    }

    let path = reference
        .split(['?', '#'])
        .next()
        .unwrap_or(reference);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(Cow::into_owned)
        .unwrap_or_else(|_| path.to_string());

    let relative = decoded.trim_start_matches(['/', '\\', '.']);
    (!relative.is_empty()).then(|| relative.to_string())
}

fn encode_file(base: &Path, relative: &str) -> Option<String> {
    let path = base.join(relative);
    match std::fs::read(&path) {
        Ok(bytes) => Some(format!(
            "data:{};base64,{}",
            mime::from_path(&path),
            STANDARD.encode(bytes)
        )),
        Err(err) => {
            log!("inline"; "keeping reference `{}`: {}", relative, err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3];

    fn base_with_image(name: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, PNG_BYTES).unwrap();
        dir
    }

    fn decode_data_uri(markup: &str) -> (String, Vec<u8>) {
        let start = markup.find("data:").unwrap();
        let rest = &markup[start + 5..];
        let end = rest.find('"').unwrap();
        let (mime, payload) = rest[..end].split_once(";base64,").unwrap();
        (mime.to_string(), STANDARD.decode(payload).unwrap())
    }

    #[test]
    fn test_no_resource_tags_unchanged() {
        let dir = TempDir::new().unwrap();
        let markup = "<html><head></head><body><p>src=\"x.png\"</p><a href=\"y.png\">y</a></body></html>";
        assert_eq!(inline_assets(markup, dir.path()), markup);
    }

    #[test]
    fn test_image_inlined_bytes_identical() {
        let dir = base_with_image("images/logo.png");
        let out = inline_assets(r#"<img class="logo" src="images/logo.png" alt="x">"#, dir.path());

        assert!(out.starts_with(r#"<img class="logo" src="data:image/png;base64,"#));
        assert!(out.ends_with(r#"" alt="x">"#));
        let (mime, bytes) = decode_data_uri(&out);
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, PNG_BYTES);
    }

    #[test]
    fn test_leading_separators_and_dots_stripped() {
        let dir = base_with_image("logo.png");
        for src in ["/logo.png", "./logo.png", "../logo.png", "\\logo.png"] {
            let out = inline_assets(&format!(r#"<img src="{src}">"#), dir.path());
            assert!(out.contains("data:image/png;base64,"), "{src}: {out}");
        }
    }

    #[test]
    fn test_single_quotes_and_percent_encoding() {
        let dir = base_with_image("my logo.png");
        let out = inline_assets("<img src='my%20logo.png?v=2'>", dir.path());
        assert!(out.starts_with("<img src='data:image/png;base64,"));
        assert!(out.ends_with("'>"));
    }

    #[test]
    fn test_unquoted_value_inlined() {
        let dir = base_with_image("logo.png");
        let out = inline_assets("<img src=logo.png width=40>", dir.path());
        assert!(out.starts_with(r#"<img src="data:image/png;base64,"#), "{out}");
        assert!(out.ends_with(r#"" width=40>"#));
        assert_eq!(decode_data_uri(&out).1, PNG_BYTES);
    }

    #[test]
    fn test_gt_inside_quoted_attribute() {
        let dir = base_with_image("logo.png");
        let out = inline_assets(r#"<img alt="a > b" src="logo.png">"#, dir.path());
        assert!(out.starts_with(r#"<img alt="a > b" src="data:image/png;base64,"#), "{out}");
        assert!(!out.contains(r#"src="logo.png""#));
    }

    #[test]
    fn test_src_text_inside_other_attribute_untouched() {
        let dir = base_with_image("logo.png");
        let markup = r#"<img alt=" src='logo.png'" src="missing.png">"#;
        assert_eq!(inline_assets(markup, dir.path()), markup);
    }

    #[test]
    fn test_srcset_candidates_inlined() {
        let dir = base_with_image("logo.png");
        let out = inline_assets(r#"<img srcset="logo.png 2x, missing.png 3x">"#, dir.path());
        assert!(out.starts_with(r#"<img srcset="data:image/png;base64,"#), "{out}");
        assert!(out.ends_with(r#" 2x, missing.png 3x">"#));
    }

    #[test]
    fn test_missing_file_keeps_reference() {
        let dir = TempDir::new().unwrap();
        let markup = r#"<img src="missing.png">"#;
        assert_eq!(inline_assets(markup, dir.path()), markup);
    }

    #[test]
    fn test_external_references_untouched() {
        let dir = TempDir::new().unwrap();
        let markup = concat!(
            r#"<img src="https://example.com/a.png">"#,
            r#"<img src="//cdn.example.com/b.png">"#,
            r#"<img src="data:image/png;base64,AAAA">"#,
            r##"<image xlink:href="#sprite">"##,
        );
        assert_eq!(inline_assets(markup, dir.path()), markup);
    }

    #[test]
    fn test_data_attributes_not_rewritten() {
        let dir = base_with_image("logo.png");
        let out = inline_assets(r#"<img data-src="logo.png" src="logo.png">"#, dir.path());
        assert!(out.contains(r#"data-src="logo.png""#));
        assert!(out.contains(r#"src="data:image/png;base64,"#));
    }

    #[test]
    fn test_repeated_reference_inlined_each_time() {
        let dir = base_with_image("logo.png");
        let out = inline_assets(r#"<img src="logo.png"><IMG SRC="logo.png">"#, dir.path());
        assert_eq!(out.matches("data:image/png;base64,").count(), 2);
    }

    #[test]
    fn test_local_reference() {
        assert_eq!(local_reference("./img/a.png").as_deref(), Some("img/a.png"));
        assert_eq!(local_reference("a.png#frag").as_deref(), Some("a.png"));
        assert_eq!(local_reference("file:///x.png"), None);
        assert_eq!(local_reference("mailto:x@y"), None);
        assert_eq!(local_reference("#top"), None);
        assert_eq!(local_reference("./"), None);
    }
}
