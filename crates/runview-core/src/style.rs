//! Pattern display styles
//!
//! Styles are persisted as a flat token list (`bold`, `italic`, `underline`,
//! plus at most one `RRGGBB` color). Internally they are a small typed
//! structure, validated once at load time.

use crate::error::{Error, Result};

/// An RGB color parsed from a six-hex-digit token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Parse an uppercase `RRGGBB` token, the form the pattern files use
    pub fn parse(token: &str) -> Option<Color> {
        if token.len() != 6 {
            return None;
        }
        if !token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
        {
            return None;
        }
        let r = u8::from_str_radix(&token[0..2], 16).ok()?;
        let g = u8::from_str_radix(&token[2..4], 16).ok()?;
        let b = u8::from_str_radix(&token[4..6], 16).ok()?;
        Some(Color { r, g, b })
    }

    /// Render back to the persisted `RRGGBB` form
    pub fn token(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Display attributes attached to a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<Color>,
}

impl TextStyle {
    /// Parse the persisted token list
    ///
    /// Rejects unknown tokens and more than one color token.
    pub fn parse(tokens: &[String]) -> Result<TextStyle> {
        let mut style = TextStyle::default();
        for token in tokens {
            match token.as_str() {
                "bold" => style.bold = true,
                "italic" => style.italic = true,
                "underline" => style.underline = true,
                other => {
                    let color = Color::parse(other)
                        .ok_or_else(|| Error::invalid_style(format!("unknown token `{other}`")))?;
                    if style.color.is_some() {
                        return Err(Error::invalid_style(format!("second color `{other}`")));
                    }
                    style.color = Some(color);
                }
            }
        }
        Ok(style)
    }

    /// Canonical token list for persistence: bold, italic, underline, color
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        if self.bold {
            tokens.push("bold".to_string());
        }
        if self.italic {
            tokens.push("italic".to_string());
        }
        if self.underline {
            tokens.push("underline".to_string());
        }
        if let Some(color) = self.color {
            tokens.push(color.token());
        }
        tokens
    }
}
