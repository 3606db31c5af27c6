/*
 * Copyright (c) 2026-present, the Ladybird developers.
 *
 * SPDX-License-Identifier: BSD-2-Clause
 */

//! Token types and Token struct for the lexer.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Invalid,
    Number,
    String,
    Punctuation,
    Operator,
    Keyword,
    ControlKeyword,
    Identifier,
}

/// Generates the `TokenType` enum with `category()` and `name()` methods.
/// Each entry maps a variant to its `TokenCategory`. The name is derived
/// automatically via `stringify!`.
macro_rules! define_tokens {
    ( $( $variant:ident => $category:ident ),* $(,)? ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum TokenType {
            $( $variant, )*
        }

        impl TokenType {
            pub fn category(self) -> TokenCategory {
                match self {
                    $( TokenType::$variant => TokenCategory::$category, )*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $( TokenType::$variant => stringify!($variant), )*
                }
            }
        }
    };
}

define_tokens! {
    Ampersand                  => Operator,
    AmpersandEquals            => Operator,
    Asterisk                   => Operator,
    AsteriskEquals             => Operator,
    BoolLiteral                => Keyword,
    BracketClose               => Punctuation,
    BracketOpen                => Punctuation,
    Break                      => ControlKeyword,
    Caret                      => Operator,
    CaretEquals                => Operator,
    Case                       => ControlKeyword,
    Catch                      => ControlKeyword,
    Colon                      => Punctuation,
    Comma                      => Punctuation,
    Continue                   => ControlKeyword,
    CurlyClose                 => Punctuation,
    CurlyOpen                  => Punctuation,
    Debugger                   => Keyword,
    Default                    => ControlKeyword,
    Delete                     => Keyword,
    Do                         => ControlKeyword,
    DoubleAmpersand            => Operator,
    DoublePipe                 => Operator,
    Else                       => ControlKeyword,
    Eof                        => Invalid,
    Equals                     => Operator,
    EqualsEquals               => Operator,
    EqualsEqualsEquals         => Operator,
    ExclamationMark            => Operator,
    ExclamationMarkEquals      => Operator,
    ExclamationMarkEqualsEquals => Operator,
    Finally                    => ControlKeyword,
    For                        => ControlKeyword,
    Function                   => Keyword,
    GreaterThan                => Operator,
    GreaterThanEquals          => Operator,
    Identifier                 => Identifier,
    If                         => ControlKeyword,
    In                         => Keyword,
    Instanceof                 => Keyword,
    Invalid                    => Invalid,
    LessThan                   => Operator,
    LessThanEquals             => Operator,
    Minus                      => Operator,
    MinusEquals                => Operator,
    MinusMinus                 => Operator,
    New                        => Keyword,
    NullLiteral                => Keyword,
    NumericLiteral             => Number,
    ParenClose                 => Punctuation,
    ParenOpen                  => Punctuation,
    Percent                    => Operator,
    PercentEquals              => Operator,
    Period                     => Operator,
    Pipe                       => Operator,
    PipeEquals                 => Operator,
    Plus                       => Operator,
    PlusEquals                 => Operator,
    PlusPlus                   => Operator,
    QuestionMark               => Operator,
    Return                     => ControlKeyword,
    Semicolon                  => Punctuation,
    ShiftLeft                  => Operator,
    ShiftLeftEquals            => Operator,
    ShiftRight                 => Operator,
    ShiftRightEquals           => Operator,
    Slash                      => Operator,
    SlashEquals                => Operator,
    StringLiteral              => String,
    Switch                     => ControlKeyword,
    This                       => Keyword,
    Throw                      => ControlKeyword,
    Tilde                      => Operator,
    Try                        => ControlKeyword,
    Typeof                     => Keyword,
    UnsignedShiftRight         => Operator,
    UnsignedShiftRightEquals   => Operator,
    Var                        => Keyword,
    Void                       => Keyword,
    While                      => ControlKeyword,
    With                       => ControlKeyword,
}

impl TokenType {
    /// Keywords are valid property names after `.` (ES5 IdentifierName).
    pub fn is_identifier_name(self) -> bool {
        matches!(
            self.category(),
            TokenCategory::Identifier | TokenCategory::Keyword | TokenCategory::ControlKeyword
        )
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    /// Decoded token value: identifier name, string contents (escapes
    /// resolved), or the raw spelling of a numeric literal.
    pub value: String,
    /// Numeric value, set for `NumericLiteral` tokens.
    pub number_value: f64,
    pub line: u32,
    pub column: u32,
    /// Whether a line terminator occurred between the previous token and
    /// this one. Drives ASI and the restricted productions.
    pub newline_before: bool,
}

impl Token {
    pub fn new(token_type: TokenType, line: u32, column: u32) -> Self {
        Token {
            token_type,
            value: String::new(),
            number_value: 0.0,
            line,
            column,
            newline_before: false,
        }
    }
}
