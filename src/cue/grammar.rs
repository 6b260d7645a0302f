//! Concrete syntax tree for cue sheets.
//!
//! Each source line becomes one [`Directive`]. Lines are then grouped into
//! blocks: a sheet holds header lines followed by `FILE` blocks, a file block
//! holds its own lines followed by `TRACK` blocks. Which directives may appear
//! in which block is checked here; cardinality and ordering rules are left to
//! the interpreter.

use crate::cue::error::{CueError, CueResult};
use crate::cue::lexer::{LexedLine, Token, tokenize};
use crate::cue::time::MSF;
use std::iter::Peekable;
use std::vec::IntoIter;

/// Which block a piece of text is parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRule {
    Sheet,
    File,
    Track,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Catalog(String),
    CdTextFile(String),
    Rem { key: String, value: String },
    Performer(String),
    Title(String),
    File { name: String, file_type: String },
    Track { number: u32, track_type: String },
    Index { number: u32, time: MSF },
    Pregap(MSF),
    Postgap(MSF),
    Flags(Vec<String>),
    Isrc(String),
}

impl Directive {
    pub fn keyword(&self) -> &'static str {
        match self {
            Directive::Catalog(_) => "CATALOG",
            Directive::CdTextFile(_) => "CDTEXTFILE",
            Directive::Rem { .. } => "REM",
            Directive::Performer(_) => "PERFORMER",
            Directive::Title(_) => "TITLE",
            Directive::File { .. } => "FILE",
            Directive::Track { .. } => "TRACK",
            Directive::Index { .. } => "INDEX",
            Directive::Pregap(_) => "PREGAP",
            Directive::Postgap(_) => "POSTGAP",
            Directive::Flags(_) => "FLAGS",
            Directive::Isrc(_) => "ISRC",
        }
    }

    fn belongs_to_track(&self) -> bool {
        matches!(
            self,
            Directive::Title(_)
                | Directive::Performer(_)
                | Directive::Rem { .. }
                | Directive::Index { .. }
                | Directive::Pregap(_)
                | Directive::Postgap(_)
                | Directive::Flags(_)
                | Directive::Isrc(_)
        )
    }

    fn belongs_to_file(&self) -> bool {
        matches!(
            self,
            Directive::Title(_) | Directive::Performer(_) | Directive::Rem { .. }
        )
    }

    fn belongs_to_sheet(&self) -> bool {
        matches!(
            self,
            Directive::Catalog(_)
                | Directive::CdTextFile(_)
                | Directive::Title(_)
                | Directive::Performer(_)
                | Directive::Rem { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub number: usize,
    pub directive: Directive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackNode {
    pub line: usize,
    pub number: u32,
    pub track_type: String,
    pub body: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileItem {
    Line(Line),
    Track(TrackNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileNode {
    pub line: usize,
    pub name: String,
    pub file_type: String,
    pub body: Vec<FileItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SheetItem {
    Line(Line),
    File(FileNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetNode {
    pub body: Vec<SheetItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxTree {
    Sheet(SheetNode),
    File(FileNode),
    Track(TrackNode),
}

pub fn parse(input: &str, start: StartRule) -> CueResult<SyntaxTree> {
    match start {
        StartRule::Sheet => parse_sheet(input).map(SyntaxTree::Sheet),
        StartRule::File => parse_file(input).map(SyntaxTree::File),
        StartRule::Track => parse_track(input).map(SyntaxTree::Track),
    }
}

pub fn parse_sheet(input: &str) -> CueResult<SheetNode> {
    let mut parser = Parser::new(input)?;
    let sheet = parser.sheet()?;
    parser.finish()?;
    Ok(sheet)
}

pub fn parse_file(input: &str) -> CueResult<FileNode> {
    let mut parser = Parser::new(input)?;
    let file = parser.file()?;
    parser.finish()?;
    Ok(file)
}

pub fn parse_track(input: &str) -> CueResult<TrackNode> {
    let mut parser = Parser::new(input)?;
    let track = parser.track()?;
    parser.finish()?;
    Ok(track)
}

struct Parser {
    lines: Peekable<IntoIter<Line>>,
    end_line: usize,
}

impl Parser {
    fn new(input: &str) -> CueResult<Self> {
        let lines = tokenize(input)?
            .into_iter()
            .map(parse_line)
            .collect::<CueResult<Vec<_>>>()?;
        let end_line = input.lines().count() + 1;

        Ok(Self {
            lines: lines.into_iter().peekable(),
            end_line,
        })
    }

    fn sheet(&mut self) -> CueResult<SheetNode> {
        let mut body = Vec::new();

        while let Some(line) = self.lines.peek() {
            match &line.directive {
                Directive::File { .. } => body.push(SheetItem::File(self.file()?)),
                directive if directive.belongs_to_sheet() && !has_file(&body) => {
                    body.extend(self.lines.next().map(SheetItem::Line));
                }
                directive if directive.belongs_to_sheet() => {
                    return Err(CueError::syntax(
                        line.number,
                        format!("{} must precede the first FILE", directive.keyword()),
                    ));
                }
                directive => {
                    return Err(CueError::syntax(
                        line.number,
                        format!("{} is not allowed outside of a FILE block", directive.keyword()),
                    ));
                }
            }
        }

        Ok(SheetNode { body })
    }

    fn file(&mut self) -> CueResult<FileNode> {
        let (line, name, file_type) = match self.lines.next() {
            Some(Line {
                number,
                directive: Directive::File { name, file_type },
            }) => (number, name, file_type),
            other => return Err(self.expected("FILE", other)),
        };

        let mut body = Vec::new();
        while let Some(next) = self.lines.peek() {
            match &next.directive {
                Directive::File { .. } => break,
                Directive::Track { .. } => body.push(FileItem::Track(self.track()?)),
                directive if directive.belongs_to_file() => {
                    body.extend(self.lines.next().map(FileItem::Line));
                }
                directive => {
                    return Err(CueError::syntax(
                        next.number,
                        format!("{} is not allowed inside a FILE block", directive.keyword()),
                    ));
                }
            }
        }

        Ok(FileNode {
            line,
            name,
            file_type,
            body,
        })
    }

    fn track(&mut self) -> CueResult<TrackNode> {
        let (line, number, track_type) = match self.lines.next() {
            Some(Line {
                number: line,
                directive: Directive::Track { number, track_type },
            }) => (line, number, track_type),
            other => return Err(self.expected("TRACK", other)),
        };

        let mut body = Vec::new();
        while let Some(next) = self.lines.next_if(|l| l.directive.belongs_to_track()) {
            body.push(next);
        }

        Ok(TrackNode {
            line,
            number,
            track_type,
            body,
        })
    }

    fn finish(&mut self) -> CueResult<()> {
        match self.lines.next() {
            None => Ok(()),
            Some(line) => Err(CueError::syntax(
                line.number,
                format!("Expected end of input, found {}", line.directive.keyword()),
            )),
        }
    }

    fn expected(&self, keyword: &str, found: Option<Line>) -> CueError {
        match found {
            Some(line) => CueError::syntax(
                line.number,
                format!("Expected {keyword}, found {}", line.directive.keyword()),
            ),
            None => CueError::syntax(
                self.end_line,
                format!("Expected {keyword}, found end of input"),
            ),
        }
    }
}

fn has_file(body: &[SheetItem]) -> bool {
    body.iter().any(|item| matches!(item, SheetItem::File(_)))
}

fn parse_line(lexed: LexedLine) -> CueResult<Line> {
    let number = lexed.number;
    let mut tokens = lexed.tokens.into_iter();
    let keyword = match tokens.next() {
        Some(Token::Word(word)) => word.to_ascii_uppercase(),
        Some(Token::Quoted(text)) => {
            return Err(CueError::syntax(
                number,
                format!("Expected a directive, found quoted string \"{text}\""),
            ));
        }
        None => return Err(CueError::syntax(number, "Empty line")),
    };
    let args: Vec<Token> = tokens.collect();

    let directive = match keyword.as_str() {
        "CATALOG" => Directive::Catalog(single(&keyword, args, number)?),
        "CDTEXTFILE" => Directive::CdTextFile(single(&keyword, args, number)?),
        "PERFORMER" => Directive::Performer(single(&keyword, args, number)?),
        "TITLE" => Directive::Title(single(&keyword, args, number)?),
        "ISRC" => Directive::Isrc(single(&keyword, args, number)?),
        "REM" => {
            let mut args = args.into_iter();
            let key = args
                .next()
                .ok_or_else(|| CueError::syntax(number, "REM expects a key"))?;
            let value = args
                .map(|token| token.text().to_string())
                .collect::<Vec<_>>()
                .join(" ");
            Directive::Rem {
                key: key.text().to_string(),
                value,
            }
        }
        "FILE" => {
            let [name, file_type] = exact::<2>(&keyword, args, number)?;
            Directive::File {
                name: name.text().to_string(),
                file_type: file_type.text().to_string(),
            }
        }
        "TRACK" => {
            let [track_number, track_type] = exact::<2>(&keyword, args, number)?;
            let track_number = parse_number(&track_number, number)?;
            if track_number == 0 {
                return Err(CueError::syntax(number, "Track numbers start at 1"));
            }
            Directive::Track {
                number: track_number,
                track_type: track_type.text().to_string(),
            }
        }
        "INDEX" => {
            let [index_number, time] = exact::<2>(&keyword, args, number)?;
            Directive::Index {
                number: parse_number(&index_number, number)?,
                time: parse_msf(&time, number)?,
            }
        }
        "PREGAP" => {
            let [time] = exact::<1>(&keyword, args, number)?;
            Directive::Pregap(parse_msf(&time, number)?)
        }
        "POSTGAP" => {
            let [time] = exact::<1>(&keyword, args, number)?;
            Directive::Postgap(parse_msf(&time, number)?)
        }
        "FLAGS" => {
            if args.is_empty() {
                return Err(CueError::syntax(number, "FLAGS expects at least one flag"));
            }
            Directive::Flags(args.iter().map(|t| t.text().to_string()).collect())
        }
        _ => {
            return Err(CueError::syntax(
                number,
                format!("Unknown directive {keyword}"),
            ));
        }
    };

    Ok(Line { number, directive })
}

fn exact<const N: usize>(keyword: &str, args: Vec<Token>, line: usize) -> CueResult<[Token; N]> {
    let found = args.len();
    args.try_into().map_err(|_| {
        CueError::syntax(
            line,
            format!("{keyword} expects {N} argument(s), found {found}"),
        )
    })
}

fn single(keyword: &str, args: Vec<Token>, line: usize) -> CueResult<String> {
    let [value] = exact::<1>(keyword, args, line)?;
    Ok(match value {
        Token::Word(text) | Token::Quoted(text) => text,
    })
}

fn parse_number(token: &Token, line: usize) -> CueResult<u32> {
    let text = token.text();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CueError::syntax(line, format!("Invalid number: {text}")));
    }
    text.parse()
        .map_err(|_| CueError::syntax(line, format!("Invalid number: {text}")))
}

fn parse_msf(token: &Token, line: usize) -> CueResult<MSF> {
    token
        .text()
        .parse()
        .map_err(|e: CueError| CueError::syntax(line, e.to_string()))
}
