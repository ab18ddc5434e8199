//! Template rendering.
//!
//! A parsed [`Template`] renders against a [`RenderContext`]: a placeholder
//! value map plus a feature-flag set. Regions whose flag is in the feature
//! set keep their body (markers dropped); all other regions disappear.
//!
//! Unresolved placeholders are governed by [`Strictness`]: the lenient
//! default passes the token through verbatim and reports it, strict mode
//! fails the render.

use std::collections::{BTreeMap, BTreeSet};

use crate::parse::{Segment, Template};
use crate::TemplateError;

/// Policy for placeholders the context has no value for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Pass the token through unmodified and report it in
    /// [`Rendered::unresolved`].
    #[default]
    Lenient,
    /// Fail the render with [`TemplateError::UnresolvedPlaceholder`].
    Strict,
}

/// Values and feature flags for one render pass.
///
/// `BTreeMap`/`BTreeSet` keep diagnostic output ordering independent of
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    values: BTreeMap<String, String>,
    features: BTreeSet<String>,
    strictness: Strictness,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self) -> Self {
        self.strictness = Strictness::Strict;
        self
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Set a placeholder value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Mark a feature present; its regions will be kept.
    pub fn enable(&mut self, flag: impl Into<String>) -> &mut Self {
        self.features.insert(flag.into());
        self
    }

    /// Mark a feature present or absent.
    pub fn set_feature(&mut self, flag: impl Into<String>, present: bool) -> &mut Self {
        let flag = flag.into();
        if present {
            self.features.insert(flag);
        } else {
            self.features.remove(&flag);
        }
        self
    }

    pub fn has_feature(&self, flag: &str) -> bool {
        self.features.contains(flag)
    }
}

/// The outcome of a successful render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Placeholder names left unresolved (lenient mode only), in order of
    /// first appearance.
    pub unresolved: Vec<String>,
}

impl Template {
    /// Render this template against `ctx`.
    pub fn render(&self, ctx: &RenderContext) -> Result<Rendered, TemplateError> {
        let mut text = String::new();
        let mut unresolved = Vec::new();
        render_segments(&self.segments, ctx, &mut text, &mut unresolved)?;
        Ok(Rendered { text, unresolved })
    }
}

fn render_segments(
    segments: &[Segment],
    ctx: &RenderContext,
    out: &mut String,
    unresolved: &mut Vec<String>,
) -> Result<(), TemplateError> {
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(name) => match ctx.values.get(name) {
                Some(value) => out.push_str(value),
                None => match ctx.strictness {
                    Strictness::Strict => {
                        return Err(TemplateError::UnresolvedPlaceholder(name.clone()));
                    }
                    Strictness::Lenient => {
                        if !unresolved.iter().any(|n| n == name) {
                            unresolved.push(name.clone());
                        }
                        out.push_str("$$_");
                        out.push_str(name);
                        out.push_str("_$$");
                    }
                },
            },
            Segment::Region { flag, body } => {
                if ctx.has_feature(flag) {
                    render_segments(body, ctx, out, unresolved)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_substitution() {
        let t = Template::parse("class $$_NAME_$$;").unwrap();
        let mut ctx = RenderContext::new();
        ctx.set("NAME", "NoteManager");
        let r = t.render(&ctx).unwrap();
        assert_eq!(r.text, "class NoteManager;");
        assert!(r.unresolved.is_empty());
    }

    #[test]
    fn lenient_passes_unknown_placeholder_through() {
        let t = Template::parse("x $$_UNKNOWN_$$ y").unwrap();
        let r = t.render(&RenderContext::new()).unwrap();
        assert_eq!(r.text, "x $$_UNKNOWN_$$ y");
        assert_eq!(r.unresolved, vec!["UNKNOWN"]);
    }

    #[test]
    fn strict_fails_unknown_placeholder() {
        let t = Template::parse("x $$_UNKNOWN_$$ y").unwrap();
        let err = t.render(&RenderContext::new().strict()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnresolvedPlaceholder("UNKNOWN".to_string())
        );
    }

    #[test]
    fn absent_feature_strips_region_and_body() {
        let t = Template::parse("_X_START_ foo _X_END_").unwrap();
        let r = t.render(&RenderContext::new()).unwrap();
        assert_eq!(r.text.trim(), "");
    }

    #[test]
    fn present_feature_keeps_body_only() {
        let t = Template::parse("_X_START_ foo _X_END_").unwrap();
        let mut ctx = RenderContext::new();
        ctx.enable("X");
        let r = t.render(&ctx).unwrap();
        assert_eq!(r.text, " foo ");
        assert!(!r.text.contains("START"));
    }

    #[test]
    fn nested_regions_gate_independently() {
        let t =
            Template::parse("_A_START_a _B_START_b_B_END_ c_A_END_").unwrap();
        let mut ctx = RenderContext::new();
        ctx.enable("A");
        assert_eq!(t.render(&ctx).unwrap().text, "a  c");

        ctx.enable("B");
        assert_eq!(t.render(&ctx).unwrap().text, "a b c");
    }
}
