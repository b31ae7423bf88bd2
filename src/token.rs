use std::{fmt, ops::Range};

#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    lo: usize,
    len: u32,
    line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Token {
        Token {
            kind,
            lo: span.lo,
            len: span.len,
            line: span.line,
        }
    }

    /// The end-of-input token for the given source.
    pub fn eof_for(src: &str) -> Token {
        let line = u32::try_from(src.lines().count().max(1)).unwrap_or(u32::MAX);
        Token::new(TokenKind::Eof, Span::new_of_length(src.len(), 0, line))
    }

    pub fn span(&self) -> Span {
        Span {
            len: self.len,
            lo: self.lo,
            line: self.line,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, {:?})", self.kind, self.span())
    }
}

/// A region of the source text, along with the (1-based) line on which it
/// starts.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct Span {
    pub len: u32,
    pub lo: usize,
    pub line: u32,
}

impl Span {
    pub fn new_of_bounds(Range { start: lo, end: hi }: Range<usize>, line: u32) -> Span {
        debug_assert!(hi >= lo);
        Self::new_of_length(lo, u32::try_from(hi - lo).unwrap(), line)
    }

    pub fn new_of_length(lo: usize, len: u32, line: u32) -> Span {
        Span { len, lo, line }
    }

    pub fn hi(&self) -> usize {
        self.lo + self.len as usize
    }

    pub fn substr(self, src: &str) -> &str {
        &src[self.lo..self.hi()]
    }

    /// Shrinks (or grows) the span on both ends.
    pub fn offset(self, lo: isize, hi: isize) -> Span {
        let new_lo = self.lo.checked_add_signed(lo).unwrap();
        let new_hi = self.hi().checked_add_signed(hi).unwrap();
        Span::new_of_bounds(new_lo..new_hi, self.line)
    }

    pub fn wrap<T>(self, inner: T) -> Spanned<T> {
        Spanned { span: self, inner }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{}, line {})", self.lo, self.hi(), self.line)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}", self.line)
    }
}

/// Some value (usually an error) tagged with the source region it refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spanned<T> {
    pub span: Span,
    pub inner: T,
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span, self.inner)
    }
}

impl<T: std::error::Error> std::error::Error for Spanned<T> {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Script,
    Raw,
    RawGlobal,
    Text,
    Movement,
    Mart,
    MapScripts,
    If,
    Elif,
    Else,
    While,
    Do,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Flag,
    Var,
    True,
    False,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Plus,
    Minus,
    Star,
    Slash,
    /// `|`
    Pipe,
    /// `&`
    Ampersand,
    /// `!`
    Bang,

    /// `==`
    Eq,
    /// `!=`
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    /// `&&`
    And,
    /// `||`
    Or,

    Identifier,
    Number,
    String,
    /// Backtick-delimited text, copied verbatim to the output.
    RawString,

    Whitespace,
    Comment,
    Eof,

    ErrorUnexpectedChar,
    ErrorUnclosedString,
    ErrorUnclosedRawString,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            TokenKind::ErrorUnexpectedChar
                | TokenKind::ErrorUnclosedString
                | TokenKind::ErrorUnclosedRawString
        )
    }

    /// Whether this token may begin a top-level statement.
    pub fn starts_top_level(self) -> bool {
        matches!(
            self,
            TokenKind::Script
                | TokenKind::Raw
                | TokenKind::RawGlobal
                | TokenKind::Text
                | TokenKind::Movement
                | TokenKind::Mart
                | TokenKind::MapScripts
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        let s = match self {
            Script => "`script`",
            Raw => "`raw`",
            RawGlobal => "`rawglobal`",
            Text => "`text`",
            Movement => "`movement`",
            Mart => "`mart`",
            MapScripts => "`mapscripts`",
            If => "`if`",
            Elif => "`elif`",
            Else => "`else`",
            While => "`while`",
            Do => "`do`",
            Switch => "`switch`",
            Case => "`case`",
            Default => "`default`",
            Break => "`break`",
            Continue => "`continue`",
            Flag => "`flag`",
            Var => "`var`",
            True => "`TRUE`",
            False => "`FALSE`",
            LParen => "`(`",
            RParen => "`)`",
            LBrace => "`{`",
            RBrace => "`}`",
            LBracket => "`[`",
            RBracket => "`]`",
            Comma => "`,`",
            Colon => "`:`",
            Semicolon => "`;`",
            Dot => "`.`",
            Plus => "`+`",
            Minus => "`-`",
            Star => "`*`",
            Slash => "`/`",
            Pipe => "`|`",
            Ampersand => "`&`",
            Bang => "`!`",
            Eq => "`==`",
            NotEq => "`!=`",
            Less => "`<`",
            LessEq => "`<=`",
            Greater => "`>`",
            GreaterEq => "`>=`",
            And => "`&&`",
            Or => "`||`",
            Identifier => "identifier",
            Number => "number",
            String => "string",
            RawString => "raw string",
            Whitespace => "whitespace",
            Comment => "comment",
            Eof => "end of input",
            ErrorUnexpectedChar => "unexpected character",
            ErrorUnclosedString => "unclosed string",
            ErrorUnclosedRawString => "unclosed raw string",
        };
        f.write_str(s)
    }
}

pub static KEYWORDS: phf::Map<&'static str, TokenKind> = phf::phf_map! {
    "script" => TokenKind::Script,
    "raw" => TokenKind::Raw,
    "rawglobal" => TokenKind::RawGlobal,
    "text" => TokenKind::Text,
    "movement" => TokenKind::Movement,
    "mart" => TokenKind::Mart,
    "mapscripts" => TokenKind::MapScripts,
    "if" => TokenKind::If,
    "elif" => TokenKind::Elif,
    "else" => TokenKind::Else,
    "while" => TokenKind::While,
    "do" => TokenKind::Do,
    "switch" => TokenKind::Switch,
    "case" => TokenKind::Case,
    "default" => TokenKind::Default,
    "break" => TokenKind::Break,
    "continue" => TokenKind::Continue,
    "flag" => TokenKind::Flag,
    "var" => TokenKind::Var,
    "TRUE" => TokenKind::True,
    "FALSE" => TokenKind::False,
};
