use super::*;

/// A bracketed form: `[]`, `[Base]`, `[Base+f]`, `[+f-g]`, …
enum Bracket {
    Empty(Span),
    Category(CategoryExpr),
}

impl<'a> Parser<'a> {
    pub(super) fn parse_change(&mut self) -> Result<ChangeStmt, ParseError> {
        let marker = self.mark();
        self.consume(TK::Dollar)?;

        let source = self.parse_source()?;
        self.consume(TK::Gt)?;
        let target = self.parse_target()?;

        let environment = if self.curr.kind == TK::Slash {
            self.advance()?;
            Some(self.parse_environment()?)
        } else {
            None
        };

        let description = if self.curr.kind == TK::Colon {
            let (text, span) = self.lexer.take_text_until(&[]);
            self.advance()?;
            Some(Name::new(text, span))
        } else {
            None
        };

        Ok(ChangeStmt {
            source,
            target,
            environment,
            description,
            span: self.close(marker),
        })
    }

    fn parse_source(&mut self) -> Result<SourceExpr, ParseError> {
        let marker = self.mark();
        let mut elements = Vec::new();
        let mut empties = Vec::new();

        while self.curr.kind != TK::Gt {
            match &self.curr.kind {
                TK::Ident(text) => {
                    elements.push(PatternExpr {
                        kind: PatternExprKind::Text(text.clone()),
                        span: self.curr.span,
                    });
                    self.advance()?;
                }
                TK::LBracket => match self.parse_bracket()? {
                    Bracket::Empty(span) => empties.push(span),
                    Bracket::Category(category) => {
                        let span = category.span;
                        elements.push(PatternExpr {
                            kind: PatternExprKind::Category(category),
                            span,
                        });
                    }
                },
                _ => return Err(ParseError::ExpectedPattern(self.curr.clone())),
            }
        }

        let kind = match (elements.is_empty(), empties.as_slice()) {
            (true, [_]) => SourceExprKind::Empty,
            (true, []) => return Err(ParseError::ExpectedPattern(self.curr.clone())),
            (_, []) => SourceExprKind::Pattern(elements),
            (_, spans) => return Err(ParseError::EmptyPatternInSequence(spans[0])),
        };

        Ok(SourceExpr {
            kind,
            span: self.close(marker),
        })
    }

    fn parse_target(&mut self) -> Result<TargetExpr, ParseError> {
        let marker = self.mark();

        let kind = match &self.curr.kind {
            TK::LBracket => match self.parse_bracket()? {
                Bracket::Empty(_) => TargetExprKind::Empty,
                Bracket::Category(CategoryExpr {
                    base: None,
                    modifiers,
                    ..
                }) => TargetExprKind::Modification(modifiers),
                Bracket::Category(category) => {
                    return Err(ParseError::CategoryInTarget(category.span));
                }
            },
            TK::Ident(_) => {
                let mut names = Vec::new();
                while let TK::Ident(text) = &self.curr.kind {
                    names.push(Name::new(text.clone(), self.curr.span));
                    self.advance()?;
                }
                TargetExprKind::Text(names)
            }
            _ => return Err(ParseError::ExpectedPattern(self.curr.clone())),
        };

        Ok(TargetExpr {
            kind,
            span: self.close(marker),
        })
    }

    fn parse_environment(&mut self) -> Result<EnvironmentExpr, ParseError> {
        enum Item {
            Seg(PatternExpr),
            Gap(Span),
            Edge(Span),
        }

        let marker = self.mark();
        let mut items = Vec::new();

        loop {
            match &self.curr.kind {
                TK::Ident(text) => {
                    items.push(Item::Seg(PatternExpr {
                        kind: PatternExprKind::Text(text.clone()),
                        span: self.curr.span,
                    }));
                    self.advance()?;
                }
                TK::LBracket => {
                    let bracket_span = self.curr.span;
                    match self.parse_bracket()? {
                        Bracket::Empty(_) => {
                            return Err(ParseError::EmptyCategory(bracket_span));
                        }
                        Bracket::Category(category) => {
                            let span = category.span;
                            items.push(Item::Seg(PatternExpr {
                                kind: PatternExprKind::Category(category),
                                span,
                            }));
                        }
                    }
                }
                TK::Underscore => {
                    items.push(Item::Gap(self.curr.span));
                    self.advance()?;
                }
                TK::Hash => {
                    items.push(Item::Edge(self.curr.span));
                    self.advance()?;
                }
                TK::Dot => {
                    items.push(Item::Seg(PatternExpr {
                        kind: PatternExprKind::Boundary,
                        span: self.curr.span,
                    }));
                    self.advance()?;
                }
                _ => break,
            }
        }

        let span = self.close(marker);

        let anchor_start = matches!(items.first(), Some(Item::Edge(_)));
        if anchor_start {
            items.remove(0);
        }
        let anchor_end = matches!(items.last(), Some(Item::Edge(_)));
        if anchor_end {
            items.pop();
        }

        let mut before = Vec::new();
        let mut after = Vec::new();
        let mut gap = None;
        for item in items {
            match item {
                Item::Seg(seg) => {
                    if gap.is_none() {
                        before.push(seg);
                    } else {
                        after.push(seg);
                    }
                }
                Item::Gap(gap_span) => {
                    if gap.is_some() {
                        return Err(ParseError::EnvironmentGap(span));
                    }
                    gap = Some(gap_span);
                }
                Item::Edge(edge_span) => return Err(ParseError::MisplacedAnchor(edge_span)),
            }
        }
        if gap.is_none() {
            return Err(ParseError::EnvironmentGap(span));
        }

        Ok(EnvironmentExpr {
            before,
            after,
            anchor_start,
            anchor_end,
            span,
        })
    }

    /// Parses a bracketed form starting at `[`.
    fn parse_bracket(&mut self) -> Result<Bracket, ParseError> {
        let marker = self.mark();
        self.consume(TK::LBracket)?;

        if self.curr.kind == TK::RBracket {
            self.advance()?;
            return Ok(Bracket::Empty(self.close(marker)));
        }

        let base = if matches!(self.curr.kind, TK::Ident(_)) {
            Some(self.parse_ident()?)
        } else {
            None
        };

        let mut modifiers = Vec::new();
        while self.curr.kind != TK::RBracket {
            let sign_span = self.curr.span;
            let positive = match self.curr.kind {
                TK::Plus => true,
                TK::Minus => false,
                _ => return Err(ParseError::ExpectedModifier(self.curr.clone())),
            };
            self.advance()?;
            let label = self.parse_label()?;
            let span = sign_span.to(label.span);
            modifiers.push(ModifierExpr {
                positive,
                label,
                span,
            });
        }
        self.consume(TK::RBracket)?;

        Ok(Bracket::Category(CategoryExpr {
            base,
            modifiers,
            span: self.close(marker),
        }))
    }

    /// A category in series position: `[Base+f-g]`. `[]` is rejected here.
    pub(super) fn parse_category(&mut self) -> Result<CategoryExpr, ParseError> {
        let bracket_span = self.curr.span;
        match self.parse_bracket()? {
            Bracket::Empty(_) => Err(ParseError::EmptyCategory(bracket_span)),
            Bracket::Category(category) => Ok(category),
        }
    }
}
