use std::fmt::Display;

use log::{trace, warn};
use logos::{Lexer, Logos, Skip};

use crate::location::{Location, Span};

#[derive(Clone, Debug, PartialEq, Default)]
pub enum LexerError {
    IntegerOverflow,
    BadEscape,
    #[default]
    IllegalCharacter,
}

impl Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexerError::IntegerOverflow => write!(f, "Integer literal does not fit in 64 bits"),
            LexerError::BadEscape => write!(f, "Invalid escape sequence"),
            LexerError::IllegalCharacter => write!(f, "Illegal character"),
        }
    }
}

pub struct LexerState {
    line: usize,
}

impl Default for LexerState {
    fn default() -> Self {
        LexerState { line: 1 }
    }
}

#[derive(Clone, Debug, Logos, PartialEq)]
#[logos(extras = LexerState, error = LexerError)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    #[token("def")]
    KwDef,
    #[token("if")]
    KwIf,
    #[token("then")]
    KwThen,
    #[token("elif")]
    KwElif,
    #[token("else")]
    KwElse,
    #[token("case")]
    KwCase,
    #[token("let")]
    KwLet,
    #[token("in")]
    KwIn,

    // Priority is set lower for identifiers because the patterns also match
    // reserved keywords.
    #[regex(r"[a-z][_a-zA-Z0-9]*", priority = 1, callback = |lex| lex.slice().to_owned())]
    LowerId(String),
    #[regex(r"[A-Z][_a-zA-Z0-9]*", priority = 1, callback = |lex| lex.slice().to_owned())]
    UpperId(String),

    #[regex(r"[0-9]+", integer_callback)]
    Number(i64),
    #[regex(r#"'([^\\'\n]|\\[ntr\\'"])'"#, char_callback)]
    Char(char),
    #[regex(r#""([^"\\\n]|\\[ntr\\'"])*""#, string_callback)]
    String(String),

    #[token("=")]
    DefEq,
    #[token(";")]
    Semicolon,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("\\")]
    Backslash,
    #[token("|")]
    Pipe,
    #[token("->")]
    Arrow,

    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("!")]
    Not,

    #[token("==")]
    Eq,
    #[token("!=")]
    Ne,
    #[token(">=")]
    Ge,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token("<")]
    Lt,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Times,
    #[token("/")]
    Div,
    #[token("%")]
    Mod,

    #[regex(r"\n", newline_callback)]
    Newline,
    #[regex(r"--[^\n]*", logos::skip)]
    Comment,
}

fn newline_callback(lexer: &mut Lexer<Token>) -> Skip {
    lexer.extras.line += 1;
    Skip
}

fn integer_callback(lexer: &mut Lexer<Token>) -> Result<i64, LexerError> {
    lexer.slice().parse::<i64>().map_err(|_| LexerError::IntegerOverflow)
}

// Strip the surrounding quotes and decode \n \t \r \\ \' \"
fn unescape_literal(slice: &str) -> Result<String, LexerError> {
    unescape::unescape(&slice[1..slice.len() - 1]).ok_or(LexerError::BadEscape)
}

fn char_callback(lexer: &mut Lexer<Token>) -> Result<char, LexerError> {
    unescape_literal(lexer.slice())?
        .chars()
        .next()
        .ok_or(LexerError::BadEscape)
}

fn string_callback(lexer: &mut Lexer<Token>) -> Result<String, LexerError> {
    unescape_literal(lexer.slice())
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
    pub line: usize,
}

// Something the tokenizer skipped over instead of producing a token
#[derive(Clone, Debug, PartialEq)]
pub struct LexerDiagnostic {
    pub error: LexerError,
    pub text: String,
    pub location: Location,
}

impl Display for LexerDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:?} on line {}", self.error, self.text, self.location.line)
    }
}

pub struct Tokenizer<'s> {
    lexer: Lexer<'s, Token>,
    diagnostics: Vec<LexerDiagnostic>,
}

impl<'s> Tokenizer<'s> {
    pub fn new(source: &'s str) -> Tokenizer<'s> {
        Tokenizer {
            lexer: Token::lexer_with_extras(source, LexerState::default()),
            diagnostics: Vec::new(),
        }
    }

    // Produce the next token, skipping (and recording) anything that fails to lex
    pub fn next_token(&mut self) -> Option<SpannedToken> {
        loop {
            let result = self.lexer.next()?;
            let span = self.lexer.span();
            let line = self.lexer.extras.line;

            match result {
                Ok(token) => {
                    trace!("line {}: {}", line, token);
                    return Some(SpannedToken { token, span, line });
                }
                Err(error) => {
                    let diagnostic = LexerDiagnostic {
                        error,
                        text: self.lexer.slice().to_owned(),
                        location: Location::new(span, line),
                    };
                    warn!("{}", diagnostic);
                    self.diagnostics.push(diagnostic);
                }
            }
        }
    }

    pub fn diagnostics(&self) -> &[LexerDiagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<LexerDiagnostic> {
        self.diagnostics
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<SpannedToken> {
        self.next_token()
    }
}

pub fn tokenize(source: &str) -> (Vec<SpannedToken>, Vec<LexerDiagnostic>) {
    let mut tokenizer = Tokenizer::new(source);
    let tokens = tokenizer.by_ref().collect();
    (tokens, tokenizer.into_diagnostics())
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::KwDef => write!(f, "'def'"),
            Token::KwIf => write!(f, "'if'"),
            Token::KwThen => write!(f, "'then'"),
            Token::KwElif => write!(f, "'elif'"),
            Token::KwElse => write!(f, "'else'"),
            Token::KwCase => write!(f, "'case'"),
            Token::KwLet => write!(f, "'let'"),
            Token::KwIn => write!(f, "'in'"),
            Token::LowerId(ident) => write!(f, "identifier '{}'", ident),
            Token::UpperId(ident) => write!(f, "constructor '{}'", ident),
            Token::Number(n) => write!(f, "integer literal {}", n),
            Token::Char(c) => write!(f, "character literal {:?}", c),
            Token::String(s) => write!(f, "string literal {:?}", s),
            Token::DefEq => write!(f, "'='"),
            Token::Semicolon => write!(f, "';'"),
            Token::LeftParen => write!(f, "'('"),
            Token::RightParen => write!(f, "')'"),
            Token::Backslash => write!(f, "'\\'"),
            Token::Pipe => write!(f, "'|'"),
            Token::Arrow => write!(f, "'->'"),
            Token::And => write!(f, "'&&'"),
            Token::Or => write!(f, "'||'"),
            Token::Not => write!(f, "'!'"),
            Token::Eq => write!(f, "'=='"),
            Token::Ne => write!(f, "'!='"),
            Token::Ge => write!(f, "'>='"),
            Token::Le => write!(f, "'<='"),
            Token::Gt => write!(f, "'>'"),
            Token::Lt => write!(f, "'<'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Times => write!(f, "'*'"),
            Token::Div => write!(f, "'/'"),
            Token::Mod => write!(f, "'%'"),
            Token::Newline => write!(f, "newline"),
            Token::Comment => write!(f, "comment"),
        }
    }
}
