//! Elements whose descendant text is excluded when collecting candidate
//! sentences from a body section. Matched by local name only, so a
//! namespaced element like `mml:mrow` is excluded the same as `mrow`.

const AVOID_TAGS: &[&str] = &[
    "xref",
    "ext-link",
    "media",
    "caption",
    "monospace",
    "label",
    "disp-formula",
    "inline-formula",
    "inline-graphic",
    "def",
    "def-list",
    "def-item",
    "term",
    "funding-source",
    "award-id",
    "graphic",
    "alternatives",
    "tex-math",
    "sec-meta",
    "kwd-group",
    "kwd",
    "object-id",
];

// MathML 3 element vocabulary, listed so a `<math>` block (with or
// without an `mml:` prefix) never leaks into extracted sentences.
const MATHML_TAGS: &[&str] = &[
    "math", "mi", "mn", "mo", "mtext", "mspace", "ms", "mrow", "mfrac", "msqrt", "mroot",
    "mstyle", "merror", "mpadded", "mphantom", "mfenced", "menclose", "msub", "msup", "msubsup",
    "munder", "mover", "munderover", "mmultiscripts", "mtable", "mtr", "mtd", "mlabeledtr",
    "maligngroup", "malignmark", "mglyph", "mprescripts", "none", "semantics",
    "annotation", "annotation-xml",
];

/// Drop the element body entirely during sanitization, not just its text.
const SANITIZE_TAGS: &[&str] =
    &["counts", "table-wrap", "table", "fig-group", "fig", "supplementary-material"];

/// True if descendant text of `local_name` must be excluded from body
/// sentence collection.
pub fn is_avoided(local_name: &str) -> bool {
    AVOID_TAGS.contains(&local_name) || MATHML_TAGS.contains(&local_name)
}

pub fn sanitize_tags() -> &'static [&'static str] {
    SANITIZE_TAGS
}
