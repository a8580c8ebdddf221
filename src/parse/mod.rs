use crate::ast::*;
use crate::diag::{Position, Span};
use crate::lexer::{Lexer, Token, TokenKind, TokenKind as TK};

mod change;
mod errors;
mod phonology;

pub use errors::ParseError;

/// Recursive-descent parser over a pulled token stream.
///
/// The parser drives the lexer directly rather than pre-tokenizing: word
/// definitions, transcriptions, import paths, and display names are raw text
/// regions that only the grammar can delimit, so the parser asks the lexer
/// for them explicitly and only keeps one structured token of lookahead.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    curr: Token,
    prev_end: Position,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let curr = lexer.next_token()?;
        Ok(Parser {
            lexer,
            curr,
            prev_end: Position::origin(),
        })
    }

    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut stmts = Vec::new();
        while self.curr.kind != TK::Eof {
            stmts.push(self.parse_stmt()?);
        }
        Ok(Program { stmts })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.prev_end = self.curr.span.end;
        self.curr = self.lexer.next_token()?;
        Ok(())
    }

    fn mark(&self) -> Position {
        self.curr.span.start
    }

    fn close(&self, marker: Position) -> Span {
        Span::new(marker, self.prev_end)
    }

    fn consume(&mut self, expected: TokenKind) -> Result<(), ParseError> {
        if self.curr.kind == expected {
            self.advance()
        } else {
            Err(ParseError::ExpectedToken(expected, self.curr.clone()))
        }
    }

    fn parse_ident(&mut self) -> Result<Name, ParseError> {
        if let TK::Ident(text) = &self.curr.kind {
            let name = Name::new(text.clone(), self.curr.span);
            self.advance()?;
            Ok(name)
        } else {
            Err(ParseError::ExpectedIdent(self.curr.clone()))
        }
    }

    /// Parses a feature label, rejoining `snake_case` idents that the lexer
    /// split at underscores. Only adjacent tokens are joined, so `a _ b`
    /// stays three tokens while `lateral_fricative` becomes one label.
    fn parse_label(&mut self) -> Result<Name, ParseError> {
        let mut name = self.parse_ident()?;
        while self.curr.kind == TK::Underscore && self.curr.span.start.offset == name.span.end.offset
        {
            let underscore_end = self.curr.span.end.offset;
            self.advance()?;
            let TK::Ident(text) = &self.curr.kind else {
                return Err(ParseError::ExpectedIdent(self.curr.clone()));
            };
            if self.curr.span.start.offset != underscore_end {
                return Err(ParseError::ExpectedIdent(self.curr.clone()));
            }
            name.text.push('_');
            name.text.push_str(text);
            name.span = name.span.to(self.curr.span);
            self.advance()?;
        }
        Ok(name)
    }

    fn parse_signed_int(&mut self) -> Result<(i64, Span), ParseError> {
        let start = self.curr.span;
        let negative = if self.curr.kind == TK::Minus {
            self.advance()?;
            true
        } else {
            false
        };
        if let TK::IntLit(value) = self.curr.kind {
            let span = start.to(self.curr.span);
            self.advance()?;
            Ok((if negative { -value } else { value }, span))
        } else {
            Err(ParseError::ExpectedInt(self.curr.clone()))
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match &self.curr.kind {
            TK::KwImport => self.parse_import().map(Stmt::Import),
            TK::KwLang => self.parse_language().map(Stmt::Language),
            TK::At => self.parse_milestone().map(Stmt::Milestone),
            TK::KwTrait => self.parse_trait().map(Stmt::Trait),
            TK::KwClass => self.parse_class().map(Stmt::Class),
            TK::KwSeries => self.parse_series().map(Stmt::Series),
            TK::Minus => self.parse_word().map(Stmt::Word),
            TK::Dollar => self.parse_change().map(Stmt::Change),
            _ => Err(ParseError::ExpectedStatement(self.curr.clone())),
        }
    }

    // -------------------------------------------------------------------------
    // Imports
    // -------------------------------------------------------------------------

    fn parse_import(&mut self) -> Result<ImportStmt, ParseError> {
        let marker = self.mark();
        self.consume(TK::KwImport)?;

        let names = match &self.curr.kind {
            TK::Star => {
                let name = ImportName {
                    kind: ImportNameKind::Wildcard,
                    span: self.curr.span,
                };
                self.advance()?;
                vec![name]
            }
            TK::LParen => {
                self.advance()?;
                let mut names = Vec::new();
                while self.curr.kind != TK::RParen {
                    let kind = match &self.curr.kind {
                        TK::Star => ImportNameKind::Wildcard,
                        TK::Ident(text) => ImportNameKind::Named(text.clone()),
                        _ => return Err(ParseError::ExpectedImportNames(self.curr.clone())),
                    };
                    names.push(ImportName {
                        kind,
                        span: self.curr.span,
                    });
                    self.advance()?;
                    if self.curr.kind == TK::Comma {
                        self.advance()?;
                    }
                }
                self.consume(TK::RParen)?;
                names
            }
            _ => return Err(ParseError::ExpectedImportNames(self.curr.clone())),
        };

        if self.curr.kind != TK::KwFrom {
            return Err(ParseError::ExpectedToken(TK::KwFrom, self.curr.clone()));
        }
        // The path is raw text to the end of the line; `from` is still the
        // lookahead token, so pull the text before refilling it.
        let (text, path_span) = self.lexer.take_text_until(&[]);
        let path = Self::parse_import_path(&text, path_span)?;
        self.advance()?;

        Ok(ImportStmt {
            names,
            path,
            span: self.close(marker),
        })
    }

    fn parse_import_path(text: &str, span: Span) -> Result<ImportPath, ParseError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ParseError::InvalidImportPath(text.to_string(), span));
        }

        let kind = if let Some(rest) = text.strip_prefix('@') {
            let Some((scope, path)) = rest.split_once('/') else {
                return Err(ParseError::InvalidImportPath(text.to_string(), span));
            };
            if scope.is_empty() || path.is_empty() {
                return Err(ParseError::InvalidImportPath(text.to_string(), span));
            }
            ImportPathKind::Scoped {
                scope: scope.to_string(),
                path: path.to_string(),
            }
        } else {
            ImportPathKind::Local {
                path: text.to_string(),
                absolute: text.starts_with('/'),
            }
        };

        Ok(ImportPath { kind, span })
    }

    // -------------------------------------------------------------------------
    // Languages and milestones
    // -------------------------------------------------------------------------

    fn parse_language(&mut self) -> Result<LanguageStmt, ParseError> {
        let marker = self.mark();
        self.consume(TK::KwLang)?;

        let id = self.parse_ident()?;

        let parent = if self.curr.kind == TK::Lt {
            self.advance()?;
            Some(self.parse_ident()?)
        } else {
            None
        };

        let name = if self.curr.kind == TK::Colon {
            let (text, span) = self.lexer.take_text_until(&[]);
            self.advance()?;
            Some(Name::new(text, span))
        } else {
            None
        };

        Ok(LanguageStmt {
            id,
            parent,
            name,
            span: self.close(marker),
        })
    }

    fn parse_milestone(&mut self) -> Result<MilestoneStmt, ParseError> {
        let marker = self.mark();
        self.consume(TK::At)?;

        let time = if matches!(self.curr.kind, TK::IntLit(_) | TK::Minus) {
            let time_marker = self.mark();
            let (start, _) = self.parse_signed_int()?;
            let kind = if self.curr.kind == TK::DotDot {
                self.advance()?;
                let (end, _) = self.parse_signed_int()?;
                TimeExprKind::Range(start, end)
            } else {
                TimeExprKind::Instant(start)
            };
            Some(TimeExpr {
                kind,
                span: self.close(time_marker),
            })
        } else {
            None
        };

        let language = match (&time, &self.curr.kind) {
            (Some(_), TK::Comma) => {
                self.advance()?;
                Some(self.parse_ident()?)
            }
            (None, _) => Some(self.parse_ident()?),
            _ => None,
        };

        Ok(MilestoneStmt {
            time,
            language,
            span: self.close(marker),
        })
    }

    // -------------------------------------------------------------------------
    // Words
    // -------------------------------------------------------------------------

    fn parse_word(&mut self) -> Result<WordStmt, ParseError> {
        let marker = self.mark();
        self.consume(TK::Minus)?;

        let gloss = self.parse_ident()?;

        if self.curr.kind != TK::Slash {
            return Err(ParseError::ExpectedTranscription(self.curr.clone()));
        }
        // The lexer sits just past the opening slash.
        let (text, prn_span) = self.lexer.take_delimited('/')?;
        let pronunciation = Name::new(text, self.curr.span.to(prn_span));
        self.advance()?;

        let definitions = if self.curr.kind == TK::LBrace {
            self.parse_word_body()?
        } else {
            Vec::new()
        };

        Ok(WordStmt {
            gloss,
            pronunciation,
            definitions,
            span: self.close(marker),
        })
    }

    /// Parses `{ pos. definition text … }`. The body is raw lines, one
    /// definition per line, so the parser scans characters directly instead
    /// of pulling tokens.
    fn parse_word_body(&mut self) -> Result<Vec<DefinitionDecl>, ParseError> {
        let open_span = self.curr.span;
        let mut definitions = Vec::new();

        loop {
            self.lexer.skip_trivia();
            match self.lexer.peek_char() {
                Some('}') => break,
                None => return Err(ParseError::UnterminatedWordBody(open_span)),
                _ => {}
            }

            let (line, span) = self.lexer.take_text_until(&['}']);
            if line.is_empty() {
                continue;
            }
            definitions.push(Self::split_definition(&line, span));
        }

        // Refill the lookahead: the next token is the closing brace.
        self.advance()?;
        self.consume(TK::RBrace)?;

        Ok(definitions)
    }

    /// Splits `noun. liquid that forms the seas` into a part of speech and
    /// the definition text. Lines without a leading one-word `pos.` prefix
    /// are taken as bare definitions.
    fn split_definition(line: &str, span: Span) -> DefinitionDecl {
        if let Some((head, tail)) = line.split_once('.')
            && !head.is_empty()
            && !head.chars().any(char::is_whitespace)
        {
            let pos_chars = head.chars().count();
            let pos_span = Span::new(
                span.start,
                Position {
                    offset: span.start.offset + pos_chars,
                    line: span.start.line,
                    column: span.start.column + pos_chars,
                },
            );
            return DefinitionDecl {
                pos: Some(Name::new(head, pos_span)),
                text: tail.trim().to_string(),
                span,
            };
        }
        DefinitionDecl {
            pos: None,
            text: line.to_string(),
            span,
        }
    }
}

#[cfg(test)]
#[path = "../tests/t_parser.rs"]
mod tests;
