use crate::cue::error::{CueError, CueResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of non-whitespace characters, taken verbatim.
    Word(String),
    /// A `"..."` string with the surrounding quotes stripped.
    Quoted(String),
}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::Word(text) | Token::Quoted(text) => text,
        }
    }
}

/// The tokens of one non-blank source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedLine {
    /// 1-based line number in the source text.
    pub number: usize,
    pub tokens: Vec<Token>,
}

pub fn tokenize(input: &str) -> CueResult<Vec<LexedLine>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut lines = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let tokens = tokenize_line(line, idx + 1)?;
        if !tokens.is_empty() {
            lines.push(LexedLine {
                number: idx + 1,
                tokens,
            });
        }
    }

    Ok(lines)
}

fn tokenize_line(line: &str, number: usize) -> CueResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('"') {
            let end = quoted
                .find('"')
                .ok_or_else(|| CueError::syntax(number, "Missing closing quote"))?;
            tokens.push(Token::Quoted(quoted[..end].to_string()));
            rest = &quoted[end + 1..];
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            tokens.push(Token::Word(rest[..end].to_string()));
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_bare_and_quoted_tokens() {
        let lines = tokenize(r#"FILE "My Book.wav" WAVE"#).unwrap();
        assert_eq!(
            lines,
            vec![LexedLine {
                number: 1,
                tokens: vec![
                    Token::Word("FILE".to_string()),
                    Token::Quoted("My Book.wav".to_string()),
                    Token::Word("WAVE".to_string()),
                ],
            }]
        );
    }

    #[test]
    fn keeps_empty_quoted_strings() {
        let lines = tokenize(r#"TITLE """#).unwrap();
        assert_eq!(lines[0].tokens[1], Token::Quoted(String::new()));
    }

    #[test]
    fn skips_blank_lines_but_keeps_line_numbers() {
        let lines = tokenize("\u{feff}TITLE a\r\n\r\n   \r\nPERFORMER b\r\n").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[0].tokens[0].text(), "TITLE");
        assert_eq!(lines[1].number, 4);
        assert_eq!(lines[1].tokens[1].text(), "b");
    }

    #[test]
    fn unterminated_quote_reports_its_line() {
        let err = tokenize("TITLE ok\nTITLE \"broken").unwrap_err();
        assert!(matches!(err, CueError::Syntax { line: 2, .. }));
    }
}
