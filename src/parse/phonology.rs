use super::*;

impl<'a> Parser<'a> {
    pub(super) fn parse_trait(&mut self) -> Result<TraitStmt, ParseError> {
        let marker = self.mark();
        self.consume(TK::KwTrait)?;

        let name = self.parse_ident()?;
        self.consume(TK::LBrace)?;

        let mut features = Vec::new();
        while self.curr.kind != TK::RBrace {
            features.push(self.parse_feature_decl()?);
            if self.curr.kind == TK::Comma {
                self.advance()?;
            }
        }
        self.consume(TK::RBrace)?;

        Ok(TraitStmt {
            name,
            features,
            span: self.close(marker),
        })
    }

    /// One trait member: `label`, `label | synonym`, `*default_label`.
    fn parse_feature_decl(&mut self) -> Result<FeatureDecl, ParseError> {
        let marker = self.mark();

        let default = if self.curr.kind == TK::Star {
            self.advance()?;
            true
        } else {
            false
        };

        let mut labels = vec![self.parse_label()?];
        while self.curr.kind == TK::Pipe {
            self.advance()?;
            labels.push(self.parse_label()?);
        }

        Ok(FeatureDecl {
            labels,
            default,
            span: self.close(marker),
        })
    }

    pub(super) fn parse_class(&mut self) -> Result<ClassStmt, ParseError> {
        let marker = self.mark();
        self.consume(TK::KwClass)?;

        let name = self.parse_ident()?;

        self.consume(TK::KwEncodes)?;
        let encodes = self.parse_ident_group()?;

        let annotates = if self.curr.kind == TK::KwAnnotates {
            self.advance()?;
            self.parse_ident_group()?
        } else {
            Vec::new()
        };

        self.consume(TK::LBrace)?;
        let mut phonemes = Vec::new();
        while self.curr.kind != TK::RBrace {
            phonemes.push(self.parse_phoneme_decl()?);
            if self.curr.kind == TK::Comma {
                self.advance()?;
            }
        }
        self.consume(TK::RBrace)?;

        Ok(ClassStmt {
            name,
            encodes,
            annotates,
            phonemes,
            span: self.close(marker),
        })
    }

    /// `(A B C)` — idents between parentheses, commas optional.
    fn parse_ident_group(&mut self) -> Result<Vec<Name>, ParseError> {
        self.consume(TK::LParen)?;
        let mut names = Vec::new();
        while self.curr.kind != TK::RParen {
            names.push(self.parse_ident()?);
            if self.curr.kind == TK::Comma {
                self.advance()?;
            }
        }
        self.consume(TK::RParen)?;
        Ok(names)
    }

    /// `glyph = label label …` — feature values positional, one per encoded
    /// trait.
    fn parse_phoneme_decl(&mut self) -> Result<PhonemeDecl, ParseError> {
        let marker = self.mark();

        let glyph = self.parse_ident()?;
        self.consume(TK::Equals)?;

        let mut features = Vec::new();
        while matches!(self.curr.kind, TK::Ident(_)) {
            features.push(self.parse_label()?);
        }

        Ok(PhonemeDecl {
            glyph,
            features,
            span: self.close(marker),
        })
    }

    pub(super) fn parse_series(&mut self) -> Result<SeriesStmt, ParseError> {
        let marker = self.mark();
        self.consume(TK::KwSeries)?;

        let name = self.parse_ident()?;
        self.consume(TK::Equals)?;

        let kind = match self.curr.kind {
            TK::LBrace => {
                self.advance()?;
                let mut glyphs = Vec::new();
                while self.curr.kind != TK::RBrace {
                    glyphs.push(self.parse_ident()?);
                    if self.curr.kind == TK::Comma {
                        self.advance()?;
                    }
                }
                self.consume(TK::RBrace)?;
                SeriesDeclKind::List(glyphs)
            }
            TK::LBracket => {
                let category = self.parse_category()?;
                SeriesDeclKind::Category(category)
            }
            _ => return Err(ParseError::ExpectedToken(TK::LBrace, self.curr.clone())),
        };

        Ok(SeriesStmt {
            name,
            kind,
            span: self.close(marker),
        })
    }
}
