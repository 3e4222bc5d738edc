//! `${{ name }}` expansion

use super::errors::ExpansionError;
use super::variables::Variables;

const OPEN: &str = "${{";
const CLOSE: &str = "}}";

/// Default bound on how deeply references may nest inside one another
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Expansion engine for workflow text
///
/// References are resolved innermost first, so `${{ a_${{ b }} }}` looks up
/// `b` and then the concatenated name. Substituted values are never rescanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateEngine {
    max_depth: usize,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of scanning one nesting level
enum Scanned {
    /// The level was closed by `}}`
    Closed(String),
    /// The text ended before the level was closed
    Unterminated(String),
}

impl TemplateEngine {
    /// Create an engine with the default nesting bound
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Create an engine with a custom nesting bound
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Expand every `${{ name }}` reference in `text`
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut vars = Variables::new();
    /// vars.set("name", "world");
    /// assert_eq!(TemplateEngine::new().expand("hello ${{ name }}", &vars)?, "hello world");
    /// ```
    pub fn expand(&self, text: &str, vars: &Variables) -> Result<String, ExpansionError> {
        let mut pos = 0;
        match self.scan(text, &mut pos, 0, vars)? {
            Scanned::Closed(out) | Scanned::Unterminated(out) => Ok(out),
        }
    }

    fn scan(
        &self,
        text: &str,
        pos: &mut usize,
        depth: usize,
        vars: &Variables,
    ) -> Result<Scanned, ExpansionError> {
        let mut out = String::new();

        while let Some(rest) = text.get(*pos..).filter(|r| !r.is_empty()) {
            if depth > 0 && rest.starts_with(CLOSE) {
                *pos += CLOSE.len();
                return Ok(Scanned::Closed(out));
            }

            if rest.starts_with(OPEN) {
                if depth >= self.max_depth {
                    return Err(ExpansionError::TooDeep {
                        limit: self.max_depth,
                    });
                }
                *pos += OPEN.len();
                match self.scan(text, pos, depth + 1, vars)? {
                    Scanned::Closed(name) => {
                        let name = name.trim();
                        let value = vars
                            .get(name)
                            .ok_or_else(|| ExpansionError::missing_variable(name, &vars.names()))?;
                        out.push_str(value);
                    }
                    Scanned::Unterminated(partial) => {
                        // no closing braces: keep the opener as literal text
                        out.push_str(OPEN);
                        out.push_str(&partial);
                    }
                }
                continue;
            }

            let Some(ch) = rest.chars().next() else {
                break;
            };
            out.push(ch);
            *pos += ch.len_utf8();
        }

        Ok(Scanned::Unterminated(out))
    }
}
