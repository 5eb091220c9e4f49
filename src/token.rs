//! Postfix regex tokens consumed by the NFA builder.

pub type Symbol = char;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Literal(Symbol),
    /// `.`
    Concat,
    /// `|`
    Alternate,
    /// `*`
    Star,
    /// `+`
    Plus,
    /// `?`
    Optional,
}

impl Token {
    pub fn from_char(c: char) -> Self {
        match c {
            '.' => Token::Concat,
            '|' => Token::Alternate,
            '*' => Token::Star,
            '+' => Token::Plus,
            '?' => Token::Optional,
            c => Token::Literal(c),
        }
    }

    pub fn is_operator(&self) -> bool {
        !matches!(self, Token::Literal(_))
    }
}

impl From<char> for Token {
    fn from(c: char) -> Self {
        Token::from_char(c)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            Token::Literal(c) => *c,
            Token::Concat => '.',
            Token::Alternate => '|',
            Token::Star => '*',
            Token::Plus => '+',
            Token::Optional => '?',
        };
        write!(f, "{}", c)
    }
}

/// Split a postfix string such as `"ab.*c."` into tokens, one per character.
pub fn tokenize_postfix(postfix: &str) -> Vec<Token> {
    postfix.chars().map(Token::from_char).collect()
}
