use std::cell::RefCell;

use lol_html::{element, rewrite_str, RewriteStrSettings};
use program_core::{AssetPathSet, ElementKind, ReferenceRewriter};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to rewrite html: {0}")]
pub struct RewriteError(String);

/// Applies the reference rewrite rules to every link, script, image and anchor of a page.
///
/// Markup outside the rewritten attributes is passed through unchanged.
#[derive(Debug, Clone)]
pub struct HtmlRewriter {
    rules: ReferenceRewriter,
}

impl HtmlRewriter {
    pub fn new(rules: ReferenceRewriter) -> Self {
        Self { rules }
    }

    /// Rewrite `html`; discovered asset paths are added to `assets` only on success.
    pub fn rewrite(&self, html: &str, assets: &mut AssetPathSet) -> Result<String, RewriteError> {
        let discovered = RefCell::new(AssetPathSet::new());
        let rules = &self.rules;

        let mut element_content_handlers = Vec::with_capacity(ElementKind::ALL.len());
        for kind in ElementKind::ALL {
            let discovered = &discovered;
            element_content_handlers.push(element!(kind.selector(), move |el| {
                let attribute = kind.attribute();
                if let Some(value) = el.get_attribute(attribute) {
                    let mut found = discovered.borrow_mut();
                    if let Some(rewritten) = rules.rewrite(kind, &value, &mut found) {
                        el.set_attribute(attribute, &rewritten)?;
                    }
                }
                Ok(())
            }));
        }

        let output = rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers,
                ..RewriteStrSettings::new()
            },
        )
        .map_err(|err| RewriteError(err.to_string()))?;

        assets.extend(discovered.into_inner());
        Ok(output)
    }
}
