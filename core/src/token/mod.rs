mod lexer;

pub use lexer::{OPERATORS, SUB_TOKENS, TOKEN_SEPARATORS, Token, parse_token};
