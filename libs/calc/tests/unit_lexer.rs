//! Unit tests for the calculator lexer module

use tally_calc::lexer::{tokenize, Lexer};
use tally_calc::token::{Keyword, TokenType};

fn types(input: &str) -> Vec<TokenType> {
    tokenize(input).into_iter().map(|t| t.token_type).collect()
}

#[test]
fn test_literal_numbers() {
    let tokens = tokenize("42 3.14 .5 1e3 2.5E-4");
    let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, ["42", "3.14", ".5", "1e3", "2.5E-4"]);
    assert!(tokens.iter().all(|t| t.token_type == TokenType::Number));
}

#[test]
fn test_trailing_dot_is_not_part_of_number() {
    let tokens = tokenize("5.");
    assert_eq!(tokens[0].token_type, TokenType::Number);
    assert_eq!(tokens[0].value, "5");
    assert_eq!(tokens[1].token_type, TokenType::Error);
}

#[test]
fn test_currency_symbols_before_and_after() {
    assert_eq!(
        types("$100 + 20 €"),
        [
            TokenType::CurrencySymbol,
            TokenType::Number,
            TokenType::Plus,
            TokenType::Number,
            TokenType::CurrencySymbol,
        ]
    );
}

#[test]
fn test_all_phrase_keywords() {
    let words = "in of per by what is increase decrease sum average mean total half \
                 double twice three quarters after before from ago now today tomorrow \
                 yesterday next last";
    let tokens = tokenize(words);
    assert_eq!(tokens.len(), 27);
    assert!(tokens
        .iter()
        .all(|t| matches!(t.token_type, TokenType::Keyword(_))));
    assert_eq!(tokens[0].token_type, TokenType::Keyword(Keyword::In));
    assert_eq!(tokens[26].token_type, TokenType::Keyword(Keyword::Last));
}

#[test]
fn test_identifiers() {
    let tokens = tokenize("monthly_rent x2 _tmp");
    assert!(tokens
        .iter()
        .all(|t| t.token_type == TokenType::Identifier));
    assert_eq!(tokens[1].value, "x2");
}

#[test]
fn test_comment_only_line_has_no_tokens() {
    assert!(tokenize("// just a note").is_empty());
    assert!(tokenize("   ").is_empty());
    assert_eq!(types("x = 3 // three"), [
        TokenType::Identifier,
        TokenType::Assign,
        TokenType::Number,
    ]);
}

#[test]
fn test_command_mode_is_verbatim() {
    let tokens = tokenize(":open ~/notes/budget.txt");
    assert_eq!(tokens[0].token_type, TokenType::Command);
    assert_eq!(tokens[0].value, "open");
    assert_eq!(tokens[1].token_type, TokenType::CommandArg);
    assert_eq!(tokens[1].value, "~/notes/budget.txt");
}

#[test]
fn test_colon_inside_line_is_not_a_command() {
    // Only a leading ':' switches modes; 10:30 is a clock time
    assert_eq!(types("10:30"), [TokenType::Time]);
}

#[test]
fn test_positions() {
    let tokens = tokenize("ab + 12km");
    let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
    assert_eq!(positions, [0, 3, 5, 7]);
    assert_eq!(tokens[3].token_type, TokenType::Unit);
}

#[test]
fn test_lexer_is_restartable() {
    let mut lexer = Lexer::new("1 + 2");
    let first = lexer.next_token();
    assert_eq!(first.token_type, TokenType::Number);
    assert_eq!(tokenize("1 + 2"), tokenize("1 + 2"));
}
