//! Calculator lexer - tokenizes one input line
//!
//! Tokenization never fails: unrecognised characters become `Error` tokens and
//! the parser decides what to do with them. `//` discards the rest of the line
//! and a leading `:` turns the remainder into verbatim command arguments.

use crate::token::{Keyword, Token, TokenType};

/// Tokenize a whole line. The trailing `Eof` token is not included.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        if token.token_type == TokenType::Eof {
            break;
        }
        tokens.push(token);
    }
    tracing::trace!(count = tokens.len(), "tokenized line");
    tokens
}

/// The calculator lexer
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    current_char: Option<char>,
    /// Set after a number so that letters glued to it lex as a unit.
    after_number: bool,
    in_command: bool,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        let mut lexer = Self {
            chars,
            position: 0,
            current_char,
            after_number: false,
            in_command: false,
        };
        lexer.skip_whitespace();
        lexer
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.chars.get(self.position).copied();
    }

    /// Peek `offset` characters ahead without advancing
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(1)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn text(&self, start: usize) -> String {
        self.chars[start..self.position].iter().collect()
    }

    fn is_identifier_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    /// Read an identifier: letters, digits and underscores
    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while let Some(c) = self.current_char {
            if Self::is_identifier_char(c) {
                self.advance();
            } else {
                break;
            }
        }
        self.text(start)
    }

    fn digits_at(&self, offset: usize, count: usize) -> bool {
        (0..count).all(|i| {
            self.peek_at(offset + i)
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false)
        })
    }

    fn consume_digits(&mut self) {
        while let Some(c) = self.current_char {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// `YYYY-MM-DD` starting at the current position.
    fn at_date(&self) -> bool {
        self.digits_at(0, 4)
            && self.peek_at(4) == Some('-')
            && self.digits_at(5, 2)
            && self.peek_at(7) == Some('-')
            && self.digits_at(8, 2)
            && !self.peek_at(10).map(Self::is_identifier_char).unwrap_or(false)
    }

    /// `H:MM` or `HH:MM` starting at the current position.
    fn at_clock_time(&self) -> bool {
        let hour_len = if self.digits_at(0, 2) { 2 } else { 1 };
        self.digits_at(0, hour_len)
            && self.peek_at(hour_len) == Some(':')
            && self.digits_at(hour_len + 1, 2)
    }

    /// `am`/`pm` at `offset`, not followed by more identifier characters.
    fn meridiem_at(&self, offset: usize) -> bool {
        let first = self.peek_at(offset).map(|c| c.to_ascii_lowercase());
        let second = self.peek_at(offset + 1).map(|c| c.to_ascii_lowercase());
        matches!(first, Some('a') | Some('p'))
            && second == Some('m')
            && !self.peek_at(offset + 2).map(Self::is_identifier_char).unwrap_or(false)
    }

    fn read_date(&mut self) -> String {
        let start = self.position;
        for _ in 0..10 {
            self.advance();
        }
        self.text(start)
    }

    /// Read a clock time: `HH:MM[:SS]` with an optional (possibly spaced) meridiem.
    fn read_clock_time(&mut self) -> String {
        let start = self.position;
        self.consume_digits();
        self.advance(); // Skip ':'
        self.consume_digits();
        if self.current_char == Some(':') && self.digits_at(1, 2) {
            self.advance(); // Skip ':'
            self.consume_digits();
        }
        let mut value = self.text(start);

        let mut gap = 0;
        while self.peek_at(gap).map(|c| c == ' ').unwrap_or(false) {
            gap += 1;
        }
        if self.meridiem_at(gap) {
            for _ in 0..gap {
                self.advance();
            }
            let meridiem_start = self.position;
            self.advance();
            self.advance();
            value.push_str(&self.text(meridiem_start).to_ascii_lowercase());
        }
        value
    }

    /// Read a number: integer or decimal, with an optional exponent
    fn read_number(&mut self) -> String {
        let start = self.position;
        self.consume_digits();

        // Only take the dot when digits follow it
        if self.current_char == Some('.') && self.digits_at(1, 1) {
            self.advance(); // Skip '.'
            self.consume_digits();
        }

        // Exponent: 1e3, 2.5E-4
        if matches!(self.current_char, Some('e') | Some('E')) {
            let sign = matches!(self.peek(), Some('+') | Some('-'));
            let digit_offset = if sign { 2 } else { 1 };
            if self.digits_at(digit_offset, 1) {
                for _ in 0..digit_offset {
                    self.advance();
                }
                self.consume_digits();
            }
        }

        self.text(start)
    }

    /// Read a double-quoted string. The quotes are not part of the value.
    fn read_text(&mut self, position: usize) -> Token {
        self.advance(); // Skip opening quote
        let start = self.position;
        while let Some(c) = self.current_char {
            if c == '"' {
                let value = self.text(start);
                self.advance(); // Skip closing quote
                return Token::new(TokenType::Text, value, position);
            }
            self.advance();
        }
        Token::error("Unterminated string".to_string(), position)
    }

    fn read_command(&mut self, position: usize) -> Token {
        self.advance(); // Skip ':'
        self.in_command = true;
        let name = self.read_identifier();
        Token::new(TokenType::Command, name, position)
    }

    /// Verbatim whitespace-separated argument
    fn read_command_arg(&mut self) -> Token {
        let start = self.position;
        while let Some(c) = self.current_char {
            if c.is_whitespace() {
                break;
            }
            self.advance();
        }
        Token::new(TokenType::CommandArg, self.text(start), start)
    }

    fn word_token(word: String, position: usize, glued: bool) -> Token {
        if let Some(keyword) = Keyword::lookup(&word) {
            return Token::new(TokenType::Keyword(keyword), word, position);
        }
        let token_type = if glued {
            TokenType::Unit
        } else {
            TokenType::Identifier
        };
        Token::new(token_type, word, position)
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        let glued = std::mem::take(&mut self.after_number)
            && self.current_char.map(|c| c.is_alphabetic()).unwrap_or(false);
        if !glued {
            self.skip_whitespace();
        }

        let position = self.position;
        let Some(c) = self.current_char else {
            return Token::eof(position);
        };

        // Line comment: the rest of the line produces no tokens, in command
        // mode too
        if c == '/' && self.peek() == Some('/') {
            self.position = self.chars.len();
            self.current_char = None;
            return Token::eof(self.position);
        }

        if self.in_command {
            return self.read_command_arg();
        }
        if c == ':' && position == self.first_non_whitespace() {
            return self.read_command(position);
        }

        let single = |lexer: &mut Lexer, token_type: TokenType| {
            lexer.advance();
            Token::new(token_type, c.to_string(), position)
        };

        match c {
            '+' => single(self, TokenType::Plus),
            '-' | '−' => single(self, TokenType::Minus),
            '*' | '×' => single(self, TokenType::Multiply),
            '/' | '÷' => single(self, TokenType::Divide),
            '%' => single(self, TokenType::Percent),
            '=' => single(self, TokenType::Assign),
            '(' => single(self, TokenType::OpenParen),
            ')' => single(self, TokenType::CloseParen),
            ',' => single(self, TokenType::Comma),
            '~' => single(self, TokenType::Tilde),
            '#' => single(self, TokenType::Hash),
            '$' | '€' | '£' | '¥' | '₹' => single(self, TokenType::CurrencySymbol),
            '"' => self.read_text(position),
            '°' => {
                self.advance();
                let rest = self.read_identifier();
                Token::new(TokenType::Unit, format!("°{rest}"), position)
            }
            _ if c.is_ascii_digit() || (c == '.' && self.digits_at(1, 1)) => {
                if self.at_date() {
                    return Token::new(TokenType::Date, self.read_date(), position);
                }
                if self.at_clock_time() {
                    return Token::new(TokenType::Time, self.read_clock_time(), position);
                }
                let value = self.read_number();
                // Bare hour with a glued meridiem: 9pm
                if !value.contains(['.', 'e', 'E']) && self.meridiem_at(0) {
                    let meridiem_start = self.position;
                    self.advance();
                    self.advance();
                    let meridiem = self.text(meridiem_start).to_ascii_lowercase();
                    return Token::new(TokenType::Time, format!("{value}{meridiem}"), position);
                }
                self.after_number = true;
                Token::new(TokenType::Number, value, position)
            }
            _ if c.is_alphabetic() || c == '_' => {
                let word = self.read_identifier();
                Self::word_token(word, position, glued)
            }
            _ => {
                self.advance();
                Token::error(format!("Unexpected character: {c}"), position)
            }
        }
    }

    fn first_non_whitespace(&self) -> usize {
        self.chars
            .iter()
            .position(|c| !c.is_whitespace())
            .unwrap_or(self.chars.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(input: &str) -> Vec<TokenType> {
        tokenize(input).into_iter().map(|t| t.token_type).collect()
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("123 45.67 .5 1e3 2.5E-2");
        let values: Vec<_> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, ["123", "45.67", ".5", "1e3", "2.5E-2"]);
        assert!(tokens.iter().all(|t| t.token_type == TokenType::Number));
    }

    #[test]
    fn test_glued_and_detached_units() {
        assert_eq!(types("5km"), [TokenType::Number, TokenType::Unit]);
        assert_eq!(types("5 km"), [TokenType::Number, TokenType::Identifier]);
        assert_eq!(types("20°C"), [TokenType::Number, TokenType::Unit]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            types("+ - * / % = ( ) ,"),
            [
                TokenType::Plus,
                TokenType::Minus,
                TokenType::Multiply,
                TokenType::Divide,
                TokenType::Percent,
                TokenType::Assign,
                TokenType::OpenParen,
                TokenType::CloseParen,
                TokenType::Comma,
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let tokens = tokenize("Half of x");
        assert_eq!(tokens[0].token_type, TokenType::Keyword(Keyword::Half));
        assert_eq!(tokens[0].value, "Half");
        assert_eq!(tokens[1].token_type, TokenType::Keyword(Keyword::Of));
        assert_eq!(tokens[2].token_type, TokenType::Identifier);
    }

    #[test]
    fn test_comment_discards_rest() {
        assert!(tokenize("// just a note").is_empty());
        assert_eq!(types("1 + 2 // three"), [
            TokenType::Number,
            TokenType::Plus,
            TokenType::Number
        ]);
    }

    #[test]
    fn test_command_arguments_are_verbatim() {
        let tokens = tokenize("  :set precision 4");
        assert_eq!(tokens[0].token_type, TokenType::Command);
        assert_eq!(tokens[0].value, "set");
        assert_eq!(tokens[1].token_type, TokenType::CommandArg);
        assert_eq!(tokens[1].value, "precision");
        assert_eq!(tokens[2].value, "4");
    }

    #[test]
    fn test_comment_ends_command_arguments() {
        let tokens = tokenize(":save a.txt // monthly budget");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].value, "save");
        assert_eq!(tokens[1].token_type, TokenType::CommandArg);
        assert_eq!(tokens[1].value, "a.txt");
        // Only a `//` at the start of an argument begins a comment
        assert_eq!(tokenize(":open a//b.txt")[1].value, "a//b.txt");
    }

    #[test]
    fn test_dates_and_times() {
        let tokens = tokenize("2024-03-01 14:30 9pm 10:15 am");
        assert_eq!(tokens[0].token_type, TokenType::Date);
        assert_eq!(tokens[0].value, "2024-03-01");
        assert_eq!(tokens[1].token_type, TokenType::Time);
        assert_eq!(tokens[1].value, "14:30");
        assert_eq!(tokens[2].value, "9pm");
        assert_eq!(tokens[3].value, "10:15am");
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_previous_reference_pieces() {
        assert_eq!(
            types("prev~2 + prev#1"),
            [
                TokenType::Identifier,
                TokenType::Tilde,
                TokenType::Number,
                TokenType::Plus,
                TokenType::Identifier,
                TokenType::Hash,
                TokenType::Number,
            ]
        );
    }

    #[test]
    fn test_unexpected_character_is_a_token() {
        let tokens = tokenize("1 & 2");
        assert_eq!(tokens[1].token_type, TokenType::Error);
        assert_eq!(tokens[1].position, 2);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_quoted_text() {
        let tokens = tokenize(r#"print("total {x} // kept")"#);
        assert_eq!(tokens[2].token_type, TokenType::Text);
        assert_eq!(tokens[2].value, "total {x} // kept");
        assert_eq!(tokens[3].token_type, TokenType::CloseParen);

        let unterminated = tokenize(r#"print("oops"#);
        assert_eq!(unterminated[2].token_type, TokenType::Error);
    }
}
