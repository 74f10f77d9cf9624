use crate::options::TypingOptions;

/// A named, pure text transform.
#[derive(Clone, Copy)]
pub struct NamedTransform {
    pub name: &'static str,
    pub apply: fn(&str) -> String,
}

/// Ordered pipeline of transforms applied to the input text once, before
/// emission begins.
#[derive(Default)]
pub struct TransformPipeline {
    transforms: Vec<NamedTransform>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, apply: fn(&str) -> String) -> Self {
        self.transforms.push(NamedTransform { name, apply });
        self
    }

    /// The pipeline selected by a session's options.
    pub fn from_options(options: &TypingOptions) -> Self {
        let mut pipeline = Self::new();
        if options.smart_punctuation {
            pipeline = pipeline.with("smart-punctuation", smarten_punctuation);
        }
        pipeline
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.name).collect()
    }

    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for transform in &self.transforms {
            out = (transform.apply)(&out);
        }
        out
    }
}

/// Replace plain punctuation with typographic equivalents.
///
/// Rules run as ordered whole-string passes: three periods become an
/// ellipsis, a double hyphen becomes an em dash, then single and double
/// quotes curl. A quote opens after start-of-string, whitespace, or an
/// opening bracket; every other quote closes. Later passes only see already
/// curled characters, which keeps them from re-matching.
pub fn smarten_punctuation(text: &str) -> String {
    let text = text.replace("...", "\u{2026}");
    let text = text.replace("--", "\u{2014}");
    let text = curl_quotes(&text, '\'', '\u{2018}', '\u{2019}');
    curl_quotes(&text, '"', '\u{201C}', '\u{201D}')
}

fn opens_quote(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '(' | '[' | '{' | '<'),
    }
}

fn curl_quotes(text: &str, plain: char, open: char, close: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    for c in text.chars() {
        let emitted = if c == plain {
            if opens_quote(prev) {
                open
            } else {
                close
            }
        } else {
            c
        };
        out.push(emitted);
        prev = Some(emitted);
    }
    out
}
