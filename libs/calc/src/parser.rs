//! Calculator parser - converts a token stream to an AST
//!
//! Recursive descent parser. Precedence (lowest to highest):
//! 1. conversion (`in`)
//! 2. additive (+, -)
//! 3. multiplicative (*, /, %)
//! 4. polarity (unary +, -)
//! 5. postfix (`%`, `ago`, `from`/`after`/`before <date>`)
//! 6. term (literal, identifier, call, `prev`, parenthesized, phrase)
//!
//! Natural-language phrases are desugared into ordinary arithmetic nodes as
//! they are parsed.

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::tokenize;
use crate::temporal::{parse_date, parse_time};
use crate::token::{Keyword, Token, TokenType};

type Result<T> = std::result::Result<T, ParseError>;

const MAX_RECURSION_DEPTH: usize = 200;

/// Name that introduces a previous-result reference.
pub const PREV: &str = "prev";

/// Parse one tokenized line.
///
/// `fuzzy` controls whether phrase keywords (`half of`, `ago`, ...) are
/// accepted; with it off they are a parse error.
pub fn parse(tokens: &[Token], fuzzy: bool) -> Result<Expression> {
    Parser::new(tokens, fuzzy).parse()
}

/// Tokenize and parse a raw line.
pub fn parse_line(input: &str, fuzzy: bool) -> Result<Expression> {
    parse(&tokenize(input), fuzzy)
}

/// Parser for calculator lines
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    fuzzy: bool,
    recursion_depth: usize,
}

impl Parser {
    /// Create a new parser over the given tokens
    pub fn new(tokens: &[Token], fuzzy: bool) -> Self {
        let end = tokens.last().map(Token::end).unwrap_or(0);
        let mut tokens = tokens.to_vec();
        tokens.push(Token::eof(end));
        Self {
            tokens,
            index: 0,
            fuzzy,
            recursion_depth: 0,
        }
    }

    /// Advance to the next token
    fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
        }
    }

    /// Get the current token; `Eof` once input is exhausted
    fn current_token(&self) -> &Token {
        self.peek_token(0)
    }

    fn peek_token(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + offset).min(last)]
    }

    /// Check if current token matches the given type
    fn current_token_is(&self, token_type: TokenType) -> bool {
        self.current_token().token_type == token_type
    }

    /// Check if current token is one of the given types
    fn current_token_is_one_of(&self, types: &[TokenType]) -> bool {
        types.contains(&self.current_token().token_type)
    }

    fn current_token_is_keyword(&self, keyword: Keyword) -> bool {
        self.current_token().is_keyword(keyword)
    }

    /// Expect a specific token type and advance
    fn expect(&mut self, token_type: TokenType, what: &str) -> Result<Token> {
        let token = self.current_token().clone();
        if token.token_type == token_type {
            self.advance();
            Ok(token)
        } else {
            Err(self.expected(what))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, what: &str) -> Result<()> {
        if self.current_token_is_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.expected(what))
        }
    }

    fn expected(&self, what: &str) -> ParseError {
        let token = self.current_token();
        let found = match token.token_type {
            TokenType::Eof => "end of input".to_string(),
            _ => format!("'{}'", token.value),
        };
        ParseError::new(format!("Expected {what}, found {found}"), token.position)
    }

    fn unexpected(&self) -> ParseError {
        let token = self.current_token();
        match token.token_type {
            TokenType::Eof => ParseError::new("Unexpected end of input", token.position),
            TokenType::Error => ParseError::new(token.value.clone(), token.position),
            _ => ParseError::new(format!("Unexpected token '{}'", token.value), token.position),
        }
    }

    /// Parse the entire line (top-level entry point)
    pub fn parse(mut self) -> Result<Expression> {
        if let Some(token) = self
            .tokens
            .iter()
            .find(|t| t.token_type == TokenType::Error)
        {
            return Err(ParseError::new(token.value.clone(), token.position));
        }

        match self.current_token().token_type.clone() {
            TokenType::Eof => return Ok(Expression::NoOp),
            TokenType::Command => return self.parse_command(),
            _ => {}
        }

        if !self.fuzzy {
            if let Some(token) = self
                .tokens
                .iter()
                .find(|t| matches!(t.token_type, TokenType::Keyword(k) if k.is_phrase()))
            {
                return Err(ParseError::new(
                    format!("'{}' needs fuzzy mode", token.value),
                    token.position,
                ));
            }
        }

        let expr = self.parse_statement()?;

        // Ensure we've consumed all input
        if !self.current_token_is(TokenType::Eof) {
            return Err(self.unexpected());
        }
        Ok(expr)
    }

    /// Check recursion depth and increment
    fn check_recursion_depth(&mut self) -> Result<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return Err(ParseError::new(
                format!("Expression too deeply nested (max depth: {MAX_RECURSION_DEPTH})"),
                self.current_token().position,
            ));
        }
        Ok(())
    }

    /// Decrement recursion depth
    fn decrement_recursion_depth(&mut self) {
        self.recursion_depth -= 1;
    }

    /// `:name arg arg`
    fn parse_command(&mut self) -> Result<Expression> {
        let command = self.current_token().clone();
        if command.value.is_empty() {
            return Err(ParseError::new("Malformed command", command.position));
        }
        self.advance();

        let mut arguments = Vec::new();
        while self.current_token_is(TokenType::CommandArg) {
            arguments.push(self.current_token().value.clone());
            self.advance();
        }
        Ok(Expression::Command {
            name: command.value.to_ascii_lowercase(),
            arguments,
        })
    }

    /// Assignment, `what is` prefix, or a plain expression
    fn parse_statement(&mut self) -> Result<Expression> {
        if self.current_token_is(TokenType::Identifier)
            && self.peek_token(1).token_type == TokenType::Assign
        {
            let target = self.current_token().clone();
            if target.value.eq_ignore_ascii_case(PREV) {
                return Err(ParseError::new("Cannot assign to 'prev'", target.position));
            }
            self.advance(); // Skip name
            self.advance(); // Skip '='
            let expression = self.parse_expression()?;
            return Ok(Expression::Assignment {
                name: target.value,
                expression: Box::new(expression),
            });
        }

        if self.current_token_is_keyword(Keyword::What)
            && self.peek_token(1).is_keyword(Keyword::Is)
        {
            self.advance();
            self.advance();
        }

        self.parse_expression()
    }

    /// Parse an expression (lowest precedence): additive chains with
    /// optional `in <unit>` conversions
    fn parse_expression(&mut self) -> Result<Expression> {
        self.check_recursion_depth()?;
        let mut expr = self.parse_additive_expression()?;

        while self.current_token_is_keyword(Keyword::In) {
            self.advance(); // Skip 'in'
            let target = self.parse_conversion_target()?;
            expr = Expression::Conversion {
                expression: Box::new(expr),
                target,
            };
        }

        self.decrement_recursion_depth();
        Ok(expr)
    }

    fn parse_conversion_target(&mut self) -> Result<String> {
        let token = self.current_token().clone();
        if token.token_type == TokenType::CurrencySymbol {
            self.advance();
            return Ok(token.value);
        }
        if !Self::is_unit_name(&token) {
            return Err(self.expected("a unit or currency after 'in'"));
        }
        self.advance();
        Ok(self.parse_compound_suffix(token))
    }

    fn is_unit_name(token: &Token) -> bool {
        matches!(
            token.token_type,
            TokenType::Identifier | TokenType::Unit | TokenType::Keyword(Keyword::Quarters)
        )
    }

    /// Extend a unit name into a ratio: `km/h` written without spaces, or
    /// `km per h`.
    fn parse_compound_suffix(&mut self, first: Token) -> String {
        let separator = self.current_token().clone();
        let denominator = self.peek_token(1).clone();
        if !matches!(
            denominator.token_type,
            TokenType::Identifier | TokenType::Unit
        ) {
            return first.value;
        }

        let joined = match separator.token_type {
            TokenType::Divide => {
                separator.position == first.end() && denominator.position == separator.end()
            }
            TokenType::Keyword(Keyword::Per) => true,
            _ => false,
        };
        if !joined {
            return first.value;
        }

        self.advance(); // Skip separator
        self.advance(); // Skip denominator
        format!("{}/{}", first.value, denominator.value)
    }

    /// Parse additive expression: expression ('+' | '-') expression
    fn parse_additive_expression(&mut self) -> Result<Expression> {
        let mut left = self.parse_multiplicative_expression()?;

        while self.current_token_is_one_of(&[TokenType::Plus, TokenType::Minus]) {
            let operator = match self.current_token().token_type.clone() {
                TokenType::Plus => BinaryOperator::Add,
                _ => BinaryOperator::Subtract,
            };
            self.advance();
            let right = self.parse_multiplicative_expression()?;
            left = Expression::binary(operator, left, right);
        }

        Ok(left)
    }

    /// Parse multiplicative expression: expression ('*' | '/' | '%') expression
    fn parse_multiplicative_expression(&mut self) -> Result<Expression> {
        let mut left = self.parse_polarity_expression()?;

        while self.current_token_is_one_of(&[
            TokenType::Multiply,
            TokenType::Divide,
            TokenType::Percent,
        ]) {
            let operator = match self.current_token().token_type.clone() {
                TokenType::Multiply => BinaryOperator::Multiply,
                TokenType::Divide => BinaryOperator::Divide,
                _ => BinaryOperator::Remainder,
            };
            self.advance();
            let right = self.parse_polarity_expression()?;
            left = Expression::binary(operator, left, right);
        }

        Ok(left)
    }

    /// Parse polarity expression: ('+' | '-') expression
    fn parse_polarity_expression(&mut self) -> Result<Expression> {
        self.check_recursion_depth()?;

        let operator = match self.current_token().token_type.clone() {
            TokenType::Minus => Some(UnaryOperator::Negate),
            TokenType::Plus => Some(UnaryOperator::Plus),
            _ => None,
        };
        let expr = match operator {
            Some(operator) => {
                self.advance();
                let operand = self.parse_polarity_expression()?;
                Expression::unary(operator, operand)
            }
            None => self.parse_postfix_expression()?,
        };

        self.decrement_recursion_depth();
        Ok(expr)
    }

    /// Postfix forms: `20%`, `20% of x`, `3 days ago`, `2 weeks from today`
    fn parse_postfix_expression(&mut self) -> Result<Expression> {
        let mut expr = self.parse_term()?;

        loop {
            match self.current_token().token_type.clone() {
                // A `%` with no operand after it is a percentage, not a remainder
                TokenType::Percent if !Self::starts_operand(self.peek_token(1)) => {
                    self.advance();
                    expr = Expression::unary(UnaryOperator::Percent, expr);
                    if self.current_token_is_keyword(Keyword::Of) {
                        self.advance();
                        let whole = self.parse_polarity_expression()?;
                        expr = Expression::binary(BinaryOperator::Remainder, expr, whole);
                    }
                }
                TokenType::Keyword(Keyword::Ago) => {
                    self.advance();
                    expr = Expression::binary(
                        BinaryOperator::Subtract,
                        Expression::DateLiteral(DateSpec::Now),
                        expr,
                    );
                }
                TokenType::Keyword(Keyword::From | Keyword::After) => {
                    self.advance();
                    let anchor = self.parse_polarity_expression()?;
                    expr = Expression::binary(BinaryOperator::Add, anchor, expr);
                }
                TokenType::Keyword(Keyword::Before) => {
                    self.advance();
                    let anchor = self.parse_polarity_expression()?;
                    expr = Expression::binary(BinaryOperator::Subtract, anchor, expr);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Whether `token` can begin an operand (used to tell `20%` from `7 % 3`)
    fn starts_operand(token: &Token) -> bool {
        match token.token_type {
            TokenType::Number
            | TokenType::Date
            | TokenType::Time
            | TokenType::Text
            | TokenType::Identifier
            | TokenType::CurrencySymbol
            | TokenType::OpenParen => true,
            TokenType::Keyword(keyword) => matches!(
                keyword,
                Keyword::What
                    | Keyword::Increase
                    | Keyword::Decrease
                    | Keyword::Sum
                    | Keyword::Average
                    | Keyword::Mean
                    | Keyword::Total
                    | Keyword::Half
                    | Keyword::Double
                    | Keyword::Twice
                    | Keyword::Three
                    | Keyword::Now
                    | Keyword::Today
                    | Keyword::Tomorrow
                    | Keyword::Yesterday
                    | Keyword::Next
                    | Keyword::Last
            ),
            _ => false,
        }
    }

    /// Parse term: literal, identifier, call, `prev`, parenthesized, phrase
    fn parse_term(&mut self) -> Result<Expression> {
        let token = self.current_token().clone();

        match token.token_type.clone() {
            TokenType::Number => self.parse_number_literal(),
            TokenType::CurrencySymbol => {
                self.advance();
                let amount = self.expect(TokenType::Number, "an amount after the currency symbol")?;
                Ok(Expression::CurrencyLiteral {
                    value: Self::number_value(&amount)?,
                    code: token.value,
                })
            }
            TokenType::Date => {
                let date = parse_date(&token.value)
                    .ok_or_else(|| ParseError::new("Invalid date", token.position))?;
                self.advance();
                if self.current_token_is(TokenType::Time) {
                    let time_token = self.current_token().clone();
                    let time = Self::time_value(&time_token)?;
                    self.advance();
                    return Ok(Expression::DateLiteral(DateSpec::At(date.and_time(time))));
                }
                Ok(Expression::DateLiteral(DateSpec::On(date)))
            }
            TokenType::Time => {
                let time = Self::time_value(&token)?;
                self.advance();
                Ok(Expression::TimeLiteral(time))
            }
            TokenType::Text => {
                self.advance();
                Ok(Expression::TextLiteral(token.value))
            }
            TokenType::Identifier => self.parse_identifier_term(token),
            TokenType::OpenParen => {
                self.advance(); // Skip '('
                let expr = self.parse_expression()?;
                self.expect(TokenType::CloseParen, "')'")?;
                Ok(expr)
            }
            TokenType::Keyword(keyword) => self.parse_keyword_term(keyword),
            _ => Err(self.unexpected()),
        }
    }

    fn number_value(token: &Token) -> Result<f64> {
        token
            .value
            .parse::<f64>()
            .map_err(|_| ParseError::new(format!("Invalid number '{}'", token.value), token.position))
    }

    fn time_value(token: &Token) -> Result<chrono::NaiveTime> {
        parse_time(&token.value)
            .ok_or_else(|| ParseError::new(format!("Invalid time '{}'", token.value), token.position))
    }

    /// A number, optionally tagged with a unit or a trailing currency symbol
    fn parse_number_literal(&mut self) -> Result<Expression> {
        let token = self.current_token().clone();
        let value = Self::number_value(&token)?;
        self.advance();

        let next = self.current_token().clone();
        if next.token_type == TokenType::CurrencySymbol {
            self.advance();
            return Ok(Expression::CurrencyLiteral {
                value,
                code: next.value,
            });
        }

        let names_unit = match next.token_type {
            TokenType::Unit | TokenType::Keyword(Keyword::Quarters) => true,
            TokenType::Identifier => {
                !next.value.eq_ignore_ascii_case(PREV)
                    && self.peek_token(1).token_type != TokenType::OpenParen
            }
            _ => false,
        };
        if names_unit {
            self.advance();
            let unit = self.parse_compound_suffix(next);
            return Ok(Expression::UnitLiteral { value, unit });
        }

        Ok(Expression::NumberLiteral(value))
    }

    /// Variable, function call, or `prev` reference
    fn parse_identifier_term(&mut self, token: Token) -> Result<Expression> {
        self.advance();

        if token.value.eq_ignore_ascii_case(PREV) {
            return self.parse_previous_reference();
        }

        if self.current_token_is(TokenType::OpenParen) {
            let arguments = self.parse_arguments()?;
            return Ok(Expression::FunctionCall {
                name: token.value.to_ascii_lowercase(),
                arguments,
            });
        }

        Ok(Expression::Identifier(token.value))
    }

    /// `prev`, `prev~`, `prev~N`, `prev#N`
    fn parse_previous_reference(&mut self) -> Result<Expression> {
        let reference = match self.current_token().token_type.clone() {
            TokenType::Tilde => {
                self.advance();
                if self.current_token_is(TokenType::Number) {
                    PreviousReference::RelativeBack(self.parse_line_count()?)
                } else {
                    PreviousReference::RelativeBack(1)
                }
            }
            TokenType::Hash => {
                self.advance();
                if !self.current_token_is(TokenType::Number) {
                    return Err(self.expected("a line number after 'prev#'"));
                }
                PreviousReference::AbsoluteLine(self.parse_line_count()?)
            }
            _ => PreviousReference::Latest,
        };
        Ok(Expression::PreviousReference(reference))
    }

    fn parse_line_count(&mut self) -> Result<u64> {
        let token = self.current_token().clone();
        let count = token
            .value
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ParseError::new("Expected a positive whole number", token.position))?;
        self.advance();
        Ok(count)
    }

    /// `( expr, expr, ... )`
    fn parse_arguments(&mut self) -> Result<Arguments> {
        self.expect(TokenType::OpenParen, "'('")?;
        let mut arguments = Arguments::new();

        if !self.current_token_is(TokenType::CloseParen) {
            loop {
                arguments.push(self.parse_expression()?);
                if self.current_token_is(TokenType::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.expect(TokenType::CloseParen, "')'")?;
        Ok(arguments)
    }

    /// Date keywords, aggregates and the phrase forms
    fn parse_keyword_term(&mut self, keyword: Keyword) -> Result<Expression> {
        let token = self.current_token().clone();

        match keyword {
            Keyword::Now | Keyword::Today | Keyword::Tomorrow | Keyword::Yesterday => {
                self.advance();
                let spec = match keyword {
                    Keyword::Now => DateSpec::Now,
                    Keyword::Today => DateSpec::Today,
                    Keyword::Tomorrow => DateSpec::Tomorrow,
                    _ => DateSpec::Yesterday,
                };
                Ok(Expression::DateLiteral(spec))
            }

            // sum(a, b) / sum of a, b
            Keyword::Sum | Keyword::Total | Keyword::Average | Keyword::Mean => {
                self.advance();
                let name = token.value.to_ascii_lowercase();
                let arguments = if self.current_token_is(TokenType::OpenParen) {
                    self.parse_arguments()?
                } else if self.current_token_is_keyword(Keyword::Of) {
                    self.advance();
                    let mut arguments = Arguments::new();
                    loop {
                        arguments.push(self.parse_additive_expression()?);
                        if self.current_token_is(TokenType::Comma) {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    arguments
                } else {
                    return Err(self.expected(&format!("'(' or 'of' after '{name}'")));
                };
                Ok(Expression::FunctionCall { name, arguments })
            }

            // half of X -> X / 2
            Keyword::Half => {
                self.advance();
                self.expect_keyword(Keyword::Of, "'of' after 'half'")?;
                let operand = self.parse_polarity_expression()?;
                Ok(Expression::binary(
                    BinaryOperator::Divide,
                    operand,
                    Expression::NumberLiteral(2.0),
                ))
            }

            // double X / twice X -> X * 2
            Keyword::Double | Keyword::Twice => {
                self.advance();
                let operand = self.parse_polarity_expression()?;
                Ok(Expression::binary(
                    BinaryOperator::Multiply,
                    operand,
                    Expression::NumberLiteral(2.0),
                ))
            }

            // three quarters of X -> X * 0.75
            Keyword::Three => {
                self.advance();
                self.expect_keyword(Keyword::Quarters, "'quarters' after 'three'")?;
                self.expect_keyword(Keyword::Of, "'of' after 'three quarters'")?;
                let operand = self.parse_polarity_expression()?;
                Ok(Expression::binary(
                    BinaryOperator::Multiply,
                    operand,
                    Expression::NumberLiteral(0.75),
                ))
            }

            // increase X by Y% -> X * (1 + Y/100)
            Keyword::Increase | Keyword::Decrease => {
                self.advance();
                let base = self.parse_additive_expression()?;
                self.expect_keyword(Keyword::By, "'by'")?;
                let amount = self.parse_polarity_expression()?;
                let operator = match keyword {
                    Keyword::Increase => BinaryOperator::Add,
                    _ => BinaryOperator::Subtract,
                };
                Ok(match amount {
                    Expression::Unary {
                        operator: UnaryOperator::Percent,
                        expression,
                    } => {
                        let fraction = Expression::binary(
                            BinaryOperator::Divide,
                            *expression,
                            Expression::NumberLiteral(100.0),
                        );
                        let factor =
                            Expression::binary(operator, Expression::NumberLiteral(1.0), fraction);
                        Expression::binary(BinaryOperator::Multiply, base, factor)
                    }
                    // `increase $100 by $5` is a plain offset
                    other => Expression::binary(operator, base, other),
                })
            }

            // next week -> today + 1 week
            Keyword::Next | Keyword::Last => {
                self.advance();
                let unit = self.current_token().clone();
                if !Self::is_unit_name(&unit) {
                    return Err(self.expected(&format!("a unit after '{}'", token.value)));
                }
                self.advance();
                let operator = match keyword {
                    Keyword::Next => BinaryOperator::Add,
                    _ => BinaryOperator::Subtract,
                };
                Ok(Expression::binary(
                    operator,
                    Expression::DateLiteral(DateSpec::Today),
                    Expression::UnitLiteral {
                        value: 1.0,
                        unit: unit.value,
                    },
                ))
            }

            _ => Err(self.unexpected()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Expression> {
        parse_line(input, true)
    }

    fn num(n: f64) -> Expression {
        Expression::NumberLiteral(n)
    }

    #[test]
    fn test_precedence() {
        let expr = parse("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                BinaryOperator::Add,
                num(1.0),
                Expression::binary(BinaryOperator::Multiply, num(2.0), num(3.0)),
            )
        );
    }

    #[test]
    fn test_unary_binds_tighter_than_multiplication() {
        let expr = parse("-2 * 3").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                BinaryOperator::Multiply,
                Expression::unary(UnaryOperator::Negate, num(2.0)),
                num(3.0),
            )
        );
    }

    #[test]
    fn test_assignment_only_at_line_start() {
        assert!(parse("x = 5").unwrap().is_assignment());
        assert!(parse("(x = 5)").is_err());
        assert!(parse("prev = 1").is_err());
    }

    #[test]
    fn test_percent_postfix_and_remainder() {
        assert_eq!(
            parse("20%").unwrap(),
            Expression::unary(UnaryOperator::Percent, num(20.0))
        );
        assert_eq!(
            parse("7 % 3").unwrap(),
            Expression::binary(BinaryOperator::Remainder, num(7.0), num(3.0))
        );
        assert_eq!(
            parse("100 + 10%").unwrap(),
            Expression::binary(
                BinaryOperator::Add,
                num(100.0),
                Expression::unary(UnaryOperator::Percent, num(10.0)),
            )
        );
    }

    #[test]
    fn test_compound_unit_needs_adjacent_slash() {
        assert_eq!(
            parse("60 km/h").unwrap(),
            Expression::UnitLiteral {
                value: 60.0,
                unit: "km/h".into()
            }
        );
        assert!(matches!(
            parse("60 km / h").unwrap(),
            Expression::Binary {
                operator: BinaryOperator::Divide,
                ..
            }
        ));
        assert_eq!(
            parse("3 m per s").unwrap(),
            Expression::UnitLiteral {
                value: 3.0,
                unit: "m/s".into()
            }
        );
    }

    #[test]
    fn test_previous_references() {
        let prev = |r| Expression::PreviousReference(r);
        assert_eq!(parse("prev").unwrap(), prev(PreviousReference::Latest));
        assert_eq!(parse("prev~").unwrap(), prev(PreviousReference::RelativeBack(1)));
        assert_eq!(parse("prev~3").unwrap(), prev(PreviousReference::RelativeBack(3)));
        assert_eq!(parse("prev#2").unwrap(), prev(PreviousReference::AbsoluteLine(2)));
        assert!(parse("prev#").is_err());
        assert!(parse("prev#0").is_err());
    }

    #[test]
    fn test_errors_carry_positions() {
        let err = parse("1 +").unwrap_err();
        assert_eq!(err.position, 3);
        let err = parse("(1 + 2").unwrap_err();
        assert!(err.message.contains("')'"));
        let err = parse("2 & 3").unwrap_err();
        assert_eq!(err.position, 2);
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let input = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        let err = parse(&input).unwrap_err();
        assert!(err.message.contains("too deeply nested"));
    }
}
