//! Token types for the calculator lexer

use phf::phf_map;

/// Natural-language words the lexer sets apart from identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    In,
    Of,
    Per,
    By,
    What,
    Is,
    Increase,
    Decrease,
    Sum,
    Average,
    Mean,
    Total,
    Half,
    Double,
    Twice,
    Three,
    Quarters,
    After,
    Before,
    From,
    Ago,
    Now,
    Today,
    Tomorrow,
    Yesterday,
    Next,
    Last,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "in" => Keyword::In,
    "of" => Keyword::Of,
    "per" => Keyword::Per,
    "by" => Keyword::By,
    "what" => Keyword::What,
    "is" => Keyword::Is,
    "increase" => Keyword::Increase,
    "decrease" => Keyword::Decrease,
    "sum" => Keyword::Sum,
    "average" => Keyword::Average,
    "mean" => Keyword::Mean,
    "total" => Keyword::Total,
    "half" => Keyword::Half,
    "double" => Keyword::Double,
    "twice" => Keyword::Twice,
    "three" => Keyword::Three,
    "quarters" => Keyword::Quarters,
    "after" => Keyword::After,
    "before" => Keyword::Before,
    "from" => Keyword::From,
    "ago" => Keyword::Ago,
    "now" => Keyword::Now,
    "today" => Keyword::Today,
    "tomorrow" => Keyword::Tomorrow,
    "yesterday" => Keyword::Yesterday,
    "next" => Keyword::Next,
    "last" => Keyword::Last,
};

impl Keyword {
    /// Case-insensitive keyword lookup.
    pub fn lookup(word: &str) -> Option<Keyword> {
        KEYWORDS.get(word.to_ascii_lowercase().as_str()).copied()
    }

    /// Phrase keywords are only meaningful in fuzzy mode. Conversion (`in`),
    /// date words and aggregate names stay available when it is off.
    pub fn is_phrase(self) -> bool {
        !matches!(
            self,
            Keyword::In
                | Keyword::Now
                | Keyword::Today
                | Keyword::Tomorrow
                | Keyword::Yesterday
                | Keyword::Sum
                | Keyword::Average
                | Keyword::Mean
                | Keyword::Total
        )
    }
}

/// Token types for the calculator lexer
#[derive(Debug, PartialEq, Clone, Eq)]
pub enum TokenType {
    // Literals
    Number,
    Date, // 2024-03-01
    Time, // 14:30, 9:05pm
    Text, // "quoted", quotes stripped

    // Names
    Identifier,
    Unit,           // letters glued to a number: 5km, 20°C
    CurrencySymbol, // $ € £ ¥ ₹
    Keyword(Keyword),

    // Operators
    Plus,       // +
    Minus,      // -
    Multiply,   // *
    Divide,     // /
    Percent,    // %
    Assign,     // =
    OpenParen,  // (
    CloseParen, // )
    Comma,      // ,
    Tilde,      // ~ (prev~N)
    Hash,       // # (prev#N)

    // Command lines: `:name arg arg`
    Command,
    CommandArg,

    // End of input
    Eof,

    // Error
    Error, // Unrecognised input; the parser reports it
}

/// A token in a calculator line
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    /// Character offset of the first character.
    pub position: usize,
}

impl Token {
    pub fn new(token_type: TokenType, value: impl Into<String>, position: usize) -> Self {
        Self {
            token_type,
            value: value.into(),
            position,
        }
    }

    pub fn eof(position: usize) -> Self {
        Self::new(TokenType::Eof, String::new(), position)
    }

    pub fn error(message: String, position: usize) -> Self {
        Self::new(TokenType::Error, message, position)
    }

    /// Character offset one past the last character.
    pub fn end(&self) -> usize {
        self.position + self.value.chars().count()
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.token_type == TokenType::Keyword(keyword)
    }
}
