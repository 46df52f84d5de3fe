//! Shader Source Buffer
//!
//! Append-only text builder the generators write into.

use std::fmt;

/// Generated shader source text.
///
/// `write!(code, ...)` and `writeln!(code, ...)` append formatted text. The inherent
/// [`write_fmt`](Self::write_fmt) shadows `fmt::Write`'s, so writes return `()`
/// instead of a `fmt::Result` that could never be an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShaderCode {
    buffer: String,
}

impl ShaderCode {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
        }
    }

    /// Appends formatted text.
    #[inline]
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        // Writing into a `String` only fails if a `Display` impl reports an error.
        let _ = fmt::Write::write_fmt(&mut self.buffer, args);
    }

    /// Appends a literal string.
    #[inline]
    pub fn push_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.buffer
    }
}

impl fmt::Display for ShaderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.buffer)
    }
}

impl From<ShaderCode> for String {
    fn from(code: ShaderCode) -> Self {
        code.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_writes_append() {
        let mut code = ShaderCode::new();
        let primitive = "lines";
        let vertex_in = 2;
        writeln!(code, "layout({primitive}) in;");
        code.push_str("void main()\n");
        writeln!(code, "\tfor (int i = 0; i < {vertex_in}; ++i) {{");

        assert_eq!(
            code.as_str(),
            "layout(lines) in;\nvoid main()\n\tfor (int i = 0; i < 2; ++i) {\n"
        );
    }

    #[test]
    fn test_empty() {
        let code = ShaderCode::with_capacity(64);
        assert!(code.is_empty());
        assert_eq!(code.len(), 0);
    }
}
