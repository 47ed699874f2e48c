//! The compiled CSS custom-property sheet.

use super::SelectorConfig;
use crate::resolve::Resolution;

const HEADER: &str = "/* Generated by solar-tokens. Do not edit by hand. */\n";

/// Renders one rule block per context.
///
/// Blocks follow [`Resolution::contexts`] order (root, themes, brands,
/// combinations). Declarations keep the resolution's name order. The root
/// block is always written, even when empty; other contexts only appear when
/// they carry at least one declaration.
pub fn emit_css(resolution: &Resolution, selectors: &SelectorConfig) -> String {
    let mut out = String::from(HEADER);
    let contexts = resolution.contexts();

    if !matches!(contexts.first(), Some(context) if context.is_root()) {
        out.push_str("\n:root {\n}\n");
    }

    for context in contexts {
        out.push('\n');
        out.push_str(&selectors.selector(context));
        out.push_str(" {\n");
        for token in resolution.in_context(context) {
            out.push_str("  ");
            out.push_str(&token.declaration());
            out.push('\n');
        }
        out.push_str("}\n");
    }
    out
}
