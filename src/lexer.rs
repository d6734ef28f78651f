use log::trace;

use crate::Real;
use crate::error::LexError;
use crate::functions::Function;
use crate::types::{Bracket, Isolator, Number, Operator, OperatorKind, Token, TokenKind};

/// Longest token the lexer accepts.
pub const MAX_TOKEN_LENGTH: usize = 1000;

/// The lexer struct, which produces tokens from an input string.
#[derive(Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: u32,
    column: u32,
    emitted: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            emitted: false,
        }
    }

    /// Peek at the current character.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advance the position by one character.
    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn advance_digits(&mut self) -> bool {
        let mut any = false;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            any = true;
        }
        any
    }

    fn check_token_length(
        &self,
        start_pos: usize,
        line: u32,
        column: u32,
    ) -> Result<(), LexError> {
        let length = self.pos - start_pos;
        if length > MAX_TOKEN_LENGTH {
            return Err(LexError::TokenTooLong {
                length,
                max: MAX_TOKEN_LENGTH,
                line,
                column,
            });
        }
        Ok(())
    }

    /// Get the next token from the input.
    ///
    /// Once the input is exhausted every further call returns an `End`
    /// token. An input with nothing but whitespace first yields one `Empty`
    /// token.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let token = self.scan()?;
        trace!("lexed {:?} at {}:{}", token.kind, token.line, token.column);
        self.emitted = true;
        Ok(token)
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let (line, column) = (self.line, self.column);
        let Some(c) = self.peek() else {
            let kind = if self.emitted {
                TokenKind::End
            } else {
                TokenKind::Empty
            };
            return Ok(Token::new(kind, line, column));
        };

        let starts_number = c.is_ascii_digit()
            || (c == '.' && self.peek_second().is_some_and(|d| d.is_ascii_digit()));
        if starts_number {
            return self.scan_number(line, column);
        }

        if c.is_ascii_alphabetic() {
            return self.scan_identifier(line, column);
        }

        let kind = match c {
            '(' => TokenKind::Bracket(Bracket::LeftRound),
            ')' => TokenKind::Bracket(Bracket::RightRound),
            '[' => TokenKind::Bracket(Bracket::LeftSquare),
            ']' => TokenKind::Bracket(Bracket::RightSquare),
            ',' => TokenKind::Isolator(Isolator::Comma),
            ':' => TokenKind::Isolator(Isolator::Colon),
            ';' => TokenKind::Isolator(Isolator::Semicolon),
            '|' => TokenKind::Isolator(Isolator::VerticalBar),
            '+' => TokenKind::Operator(Operator::new(OperatorKind::Plus)),
            '-' => TokenKind::Operator(Operator::new(OperatorKind::Minus)),
            '*' => TokenKind::Operator(Operator::new(OperatorKind::Times)),
            '/' => TokenKind::Operator(Operator::new(OperatorKind::Divide)),
            '^' => TokenKind::Operator(Operator::new(OperatorKind::Power)),
            '.' => TokenKind::Dot,
            _ => {
                return Err(LexError::UnexpectedCharacter {
                    character: c,
                    line,
                    column,
                });
            }
        };
        self.advance();
        Ok(Token::new(kind, line, column))
    }

    /// Number (integer or float, possibly scientific notation).
    fn scan_number(&mut self, line: u32, column: u32) -> Result<Token, LexError> {
        let start_pos = self.pos;
        let mut is_float = false;

        self.advance_digits();
        if self.peek() == Some('.') {
            is_float = true;
            self.advance();
            self.advance_digits();
        }

        // The exponent is only taken when digits follow `e`, `e+` or `e-`;
        // otherwise the `e` is left for the next token.
        if matches!(self.peek(), Some('e' | 'E')) {
            let rest = &self.input[self.pos..];
            let mut chars = rest.chars().skip(1);
            let exponent_follows = match chars.next() {
                Some('+' | '-') => chars.next().is_some_and(|d| d.is_ascii_digit()),
                Some(d) => d.is_ascii_digit(),
                None => false,
            };
            if exponent_follows {
                is_float = true;
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.advance_digits();
            }
        }

        self.check_token_length(start_pos, line, column)?;

        let text = &self.input[start_pos..self.pos];
        let malformed = || LexError::MalformedNumber {
            text: text.to_string(),
            line,
            column,
        };
        let number = if is_float {
            Number::Float(text.parse::<Real>().map_err(|_| malformed())?)
        } else {
            match text.parse::<i64>() {
                Ok(i) => Number::Int(i),
                // Integer literals beyond i64 are kept as floats
                Err(_) => Number::Float(text.parse::<Real>().map_err(|_| malformed())?),
            }
        };
        Ok(Token::new(TokenKind::Number(number), line, column))
    }

    /// Identifier: a single letter is a variable, longer runs must name a
    /// library function.
    fn scan_identifier(&mut self, line: u32, column: u32) -> Result<Token, LexError> {
        let start_pos = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.advance();
        }
        self.check_token_length(start_pos, line, column)?;

        let ident = self.input[start_pos..self.pos].to_ascii_lowercase();
        let mut chars = ident.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            return Ok(Token::new(TokenKind::Variable(letter), line, column));
        }

        match Function::from_name(&ident) {
            Some(function) => Ok(Token::new(TokenKind::Function(function), line, column)),
            None => Err(LexError::UnknownIdentifier {
                name: ident,
                line,
                column,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(input);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token.kind == TokenKind::End {
                break;
            }
            kinds.push(token.kind);
        }
        kinds
    }

    fn op(kind: OperatorKind) -> TokenKind {
        TokenKind::Operator(Operator::new(kind))
    }

    #[test]
    fn test_lexer_tokenization_all_types() {
        let kinds = kinds("sin(x)*2.5e-1 : [0, 10) | (1,2] ; -y^3");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Function(Function::Sin),
                TokenKind::Bracket(Bracket::LeftRound),
                TokenKind::Variable('x'),
                TokenKind::Bracket(Bracket::RightRound),
                op(OperatorKind::Times),
                TokenKind::Number(Number::Float(0.25)),
                TokenKind::Isolator(Isolator::Colon),
                TokenKind::Bracket(Bracket::LeftSquare),
                TokenKind::Number(Number::Int(0)),
                TokenKind::Isolator(Isolator::Comma),
                TokenKind::Number(Number::Int(10)),
                TokenKind::Bracket(Bracket::RightRound),
                TokenKind::Isolator(Isolator::VerticalBar),
                TokenKind::Bracket(Bracket::LeftRound),
                TokenKind::Number(Number::Int(1)),
                TokenKind::Isolator(Isolator::Comma),
                TokenKind::Number(Number::Int(2)),
                TokenKind::Bracket(Bracket::RightSquare),
                TokenKind::Isolator(Isolator::Semicolon),
                op(OperatorKind::Minus),
                TokenKind::Variable('y'),
                op(OperatorKind::Power),
                TokenKind::Number(Number::Int(3)),
            ]
        );
    }

    #[test]
    fn test_lexer_decimal_with_leading_dot() {
        assert_eq!(
            kinds(".5 .9e2 3."),
            vec![
                TokenKind::Number(Number::Float(0.5)),
                TokenKind::Number(Number::Float(90.0)),
                TokenKind::Number(Number::Float(3.0)),
            ]
        );
    }

    #[test]
    fn test_lexer_bare_dot() {
        assert_eq!(kinds("x.y")[1], TokenKind::Dot);
    }

    #[test]
    fn test_exponent_requires_digits() {
        // `2e` is the number 2 followed by the variable e
        assert_eq!(
            kinds("2e"),
            vec![TokenKind::Number(Number::Int(2)), TokenKind::Variable('e')]
        );
        assert_eq!(
            kinds("2e+"),
            vec![
                TokenKind::Number(Number::Int(2)),
                TokenKind::Variable('e'),
                op(OperatorKind::Plus),
            ]
        );
        assert_eq!(kinds("2E+2"), vec![TokenKind::Number(Number::Float(200.0))]);
    }

    #[test]
    fn test_huge_integer_becomes_float() {
        assert_eq!(
            kinds("100000000000000000000"),
            vec![TokenKind::Number(Number::Float(1e20))]
        );
    }

    #[test]
    fn test_lexer_unknown_identifier() {
        let mut lexer = Lexer::new("x + foo");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(
            err,
            LexError::UnknownIdentifier {
                name: "foo".to_string(),
                line: 1,
                column: 5,
            }
        );
    }

    #[test]
    fn test_lexer_unexpected_character_position() {
        let mut lexer = Lexer::new("1 +\n  $");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedCharacter {
                character: '$',
                line: 2,
                column: 3,
            }
        );
    }

    #[test]
    fn test_token_too_long() {
        let input = "1".repeat(MAX_TOKEN_LENGTH + 1);
        let err = Lexer::new(&input).next_token().unwrap_err();
        assert!(matches!(err, LexError::TokenTooLong { .. }));
    }

    #[test]
    fn test_empty_input_yields_empty_then_end() {
        let mut lexer = Lexer::new("   \t ");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Empty);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::End);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::End);
    }

    #[test]
    fn test_end_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Variable('x'));
        for _ in 0..3 {
            assert_eq!(lexer.next_token().unwrap().kind, TokenKind::End);
        }
    }

    #[test]
    fn test_uppercase_identifiers_are_lowered() {
        assert_eq!(
            kinds("COS(X)")[..3],
            [
                TokenKind::Function(Function::Cos),
                TokenKind::Bracket(Bracket::LeftRound),
                TokenKind::Variable('x'),
            ]
        );
    }
}
