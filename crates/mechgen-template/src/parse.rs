//! One-pass template parser.
//!
//! Scans the raw text byte-by-byte and produces a [`Template`] — a tree of
//! [`Segment`]s. Marker syntax:
//!
//! - placeholder: `$$_` name `_$$`
//! - region start: `_` FLAG `_START_`
//! - region end: `_` FLAG `_END_`
//!
//! FLAG is a non-empty run of `A-Z`, `0-9` and `_`. Anything that does not
//! scan as a marker is literal text, so generated-language identifiers with
//! underscores pass through untouched.

use crate::TemplateError;

/// One node of parsed template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Verbatim text.
    Literal(String),
    /// `$$_NAME_$$` — replaced wholesale at render time.
    Placeholder(String),
    /// `_FLAG_START_` … `_FLAG_END_` — kept or deleted as a unit.
    Region { flag: String, body: Vec<Segment> },
}

/// A parsed template, ready to render any number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<Segment>,
}

/// Flat scanner token, before region nesting is resolved.
enum Token {
    Literal(String),
    Placeholder(String),
    RegionStart(String),
    RegionEnd(String),
}

const PLACEHOLDER_OPEN: &str = "$$_";
const PLACEHOLDER_CLOSE: &str = "_$$";
const REGION_START_SUFFIX: &str = "_START_";
const REGION_END_SUFFIX: &str = "_END_";

fn is_flag_byte(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'
}

impl Template {
    /// Parse template text into segment form.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let tokens = scan(text)?;
        build_tree(tokens)
    }

    /// Every placeholder name in the template, in order of appearance,
    /// regions included.
    pub fn placeholder_names(&self) -> Vec<&str> {
        fn walk<'a>(segments: &'a [Segment], out: &mut Vec<&'a str>) {
            for seg in segments {
                match seg {
                    Segment::Placeholder(name) => out.push(name),
                    Segment::Region { body, .. } => walk(body, out),
                    Segment::Literal(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.segments, &mut out);
        out
    }

    /// Every region flag in the template, outermost-first.
    pub fn region_flags(&self) -> Vec<&str> {
        fn walk<'a>(segments: &'a [Segment], out: &mut Vec<&'a str>) {
            for seg in segments {
                if let Segment::Region { flag, body } = seg {
                    out.push(flag);
                    walk(body, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.segments, &mut out);
        out
    }
}

// ─────────────────────────────────────────────────────────────
// Scanner
// ─────────────────────────────────────────────────────────────

fn scan(text: &str) -> Result<Vec<Token>, TemplateError> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        // Placeholder?
        if text[pos..].starts_with(PLACEHOLDER_OPEN) {
            let name_start = pos + PLACEHOLDER_OPEN.len();
            match text[name_start..].find(PLACEHOLDER_CLOSE) {
                Some(rel) if rel > 0 => {
                    flush_literal(&mut literal, &mut tokens);
                    let name = &text[name_start..name_start + rel];
                    tokens.push(Token::Placeholder(name.to_string()));
                    pos = name_start + rel + PLACEHOLDER_CLOSE.len();
                    continue;
                }
                _ => return Err(TemplateError::UnterminatedPlaceholder(pos)),
            }
        }

        // Region marker?
        if bytes[pos] == b'_' {
            let run_end = bytes[pos..]
                .iter()
                .position(|&b| !is_flag_byte(b))
                .map(|rel| pos + rel)
                .unwrap_or(bytes.len());
            let run = &text[pos..run_end];

            if let Some(flag) = marker_flag(run, REGION_START_SUFFIX) {
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::RegionStart(flag.to_string()));
                pos = run_end;
                continue;
            }
            if let Some(flag) = marker_flag(run, REGION_END_SUFFIX) {
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::RegionEnd(flag.to_string()));
                pos = run_end;
                continue;
            }
        }

        // Literal byte. Markers are pure ASCII, so multi-byte characters
        // can be copied through without re-inspection.
        let ch_len = text[pos..]
            .chars()
            .next()
            .map(|c| c.len_utf8())
            .unwrap_or(1);
        literal.push_str(&text[pos..pos + ch_len]);
        pos += ch_len;
    }

    flush_literal(&mut literal, &mut tokens);
    Ok(tokens)
}

/// `_FLAG_START_` → `FLAG`, for a maximal flag-character run.
fn marker_flag<'a>(run: &'a str, suffix: &str) -> Option<&'a str> {
    let flag = run.strip_prefix('_')?.strip_suffix(suffix)?;
    if flag.is_empty() || flag.starts_with('_') || flag.ends_with('_') {
        return None;
    }
    Some(flag)
}

fn flush_literal(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

// ─────────────────────────────────────────────────────────────
// Region nesting
// ─────────────────────────────────────────────────────────────

fn build_tree(tokens: Vec<Token>) -> Result<Template, TemplateError> {
    // Stack of open regions; the bottom entry is the template root.
    let mut stack: Vec<(Option<String>, Vec<Segment>)> = vec![(None, Vec::new())];

    for token in tokens {
        match token {
            Token::Literal(text) => {
                stack
                    .last_mut()
                    .expect("stack never empty")
                    .1
                    .push(Segment::Literal(text));
            }
            Token::Placeholder(name) => {
                stack
                    .last_mut()
                    .expect("stack never empty")
                    .1
                    .push(Segment::Placeholder(name));
            }
            Token::RegionStart(flag) => {
                stack.push((Some(flag), Vec::new()));
            }
            Token::RegionEnd(flag) => {
                let (open_flag, body) = stack.pop().expect("stack never empty");
                match open_flag {
                    None => return Err(TemplateError::UnmatchedRegionEnd(flag)),
                    Some(open) if open == flag => {
                        stack
                            .last_mut()
                            .expect("root remains")
                            .1
                            .push(Segment::Region { flag, body });
                    }
                    Some(open) => {
                        return Err(TemplateError::CrossedRegions {
                            expected: open,
                            found: flag,
                        });
                    }
                }
            }
        }
    }

    // The root frame is the only one with no flag, so any unclosed region
    // is still on top of the stack here.
    let (root_flag, segments) = stack.pop().expect("stack never empty");
    match root_flag {
        Some(flag) => Err(TemplateError::UnclosedRegion(flag)),
        None => Ok(Template { segments }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_literal() {
        let t = Template::parse("no markers here, just m_ntName and MOTOR_USAGE").unwrap();
        assert_eq!(t.segments.len(), 1);
        assert!(matches!(&t.segments[0], Segment::Literal(s) if s.contains("m_ntName")));
    }

    #[test]
    fn placeholder_is_extracted() {
        let t = Template::parse("class $$_MECHANISM_NAME_$$ {};").unwrap();
        assert_eq!(
            t.segments,
            vec![
                Segment::Literal("class ".to_string()),
                Segment::Placeholder("MECHANISM_NAME".to_string()),
                Segment::Literal(" {};".to_string()),
            ]
        );
    }

    #[test]
    fn region_is_nested() {
        let t = Template::parse("a _X_START_ b $$_P_$$ c _X_END_ d").unwrap();
        assert_eq!(t.region_flags(), vec!["X"]);
        assert_eq!(t.placeholder_names(), vec!["P"]);
    }

    #[test]
    fn regions_nest_recursively() {
        let t = Template::parse("_OUTER_START_ x _INNER_START_ y _INNER_END_ z _OUTER_END_")
            .unwrap();
        assert_eq!(t.region_flags(), vec!["OUTER", "INNER"]);
    }

    #[test]
    fn unterminated_placeholder_is_an_error() {
        let err = Template::parse("before $$_OOPS").unwrap_err();
        assert!(matches!(err, TemplateError::UnterminatedPlaceholder(7)));
    }

    #[test]
    fn unmatched_end_is_an_error() {
        let err = Template::parse("text _X_END_").unwrap_err();
        assert_eq!(err, TemplateError::UnmatchedRegionEnd("X".to_string()));
    }

    #[test]
    fn unclosed_region_is_an_error() {
        let err = Template::parse("_X_START_ body").unwrap_err();
        assert_eq!(err, TemplateError::UnclosedRegion("X".to_string()));
    }

    #[test]
    fn crossed_regions_are_an_error() {
        let err = Template::parse("_A_START_ _B_START_ _A_END_ _B_END_").unwrap_err();
        assert_eq!(
            err,
            TemplateError::CrossedRegions {
                expected: "B".to_string(),
                found: "A".to_string(),
            }
        );
    }

    #[test]
    fn underscore_identifiers_stay_literal() {
        let t = Template::parse("RobotElementNames::MOTOR_CONTROLLER_USAGE m_table __units__")
            .unwrap();
        assert_eq!(t.segments.len(), 1);
    }

    #[test]
    fn compound_flag_names_parse() {
        let t = Template::parse("_UPDATE_TARGET_PERCENT_OUTPUT_START_ x _UPDATE_TARGET_PERCENT_OUTPUT_END_")
            .unwrap();
        assert_eq!(t.region_flags(), vec!["UPDATE_TARGET_PERCENT_OUTPUT"]);
    }
}
