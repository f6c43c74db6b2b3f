use std::fmt::{self, Display};

use internment::LocalIntern;
use log::trace;
use logos::Logos;
use thiserror::Error;

#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
enum LogosToken {
    // blank lines holding only blanks fold into the same run
    #[regex(r"\r?\n([ \t]*\r?\n)*")]
    Newline,

    #[token("true")]
    True,

    #[token("false")]
    False,

    //keywords
    #[token("IF")]
    If,

    #[token("THEN")]
    Then,

    #[token("ELSE")]
    Else,

    #[token("ENDIF")]
    EndIf,

    #[token("WHILE")]
    While,

    #[token("ENDWHILE")]
    EndWhile,

    #[token("REPEAT")]
    Repeat,

    #[token("UNTIL")]
    Until,

    #[token("FOR")]
    For,

    #[token("TO")]
    To,

    #[token("STEP")]
    Step,

    #[token("NEXT")]
    Next,

    #[token("Print")]
    #[token("Display")]
    Output,

    #[token("BEGIN")]
    Begin,

    #[token("END")]
    End,

    #[regex(r"'[^'\n]*'")]
    SingleQuoted,

    #[regex(r#""[^"\n]*""#)]
    DoubleQuoted,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    #[regex(r"[0-9]+\.[0-9]*")]
    Float,

    #[regex(r"[0-9]+")]
    Int,

    #[token("==")]
    Equal,

    #[token("<>")]
    NotEqual,

    #[token(">=")]
    GreaterEqual,

    #[token("<=")]
    LessEqual,

    #[token(">")]
    Greater,

    #[token("<")]
    Less,

    #[token("=")]
    Assign,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[error]
    #[regex(r"[ \t]+", logos::skip)]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'a> {
    Newline,
    True,
    False,
    Identifier(&'a str),
    Int(&'a str),
    Float(&'a str),
    Equal,
    NotEqual,
    GreaterEqual,
    LessEqual,
    Greater,
    Less,
    Assign,
    /// Literal text including the surrounding quotes.
    SingleQuoted(&'a str),
    DoubleQuoted(&'a str),
    If,
    Then,
    Else,
    EndIf,
    While,
    EndWhile,
    Repeat,
    Until,
    For,
    To,
    Step,
    Next,
    /// `Print` or `Display`, spelling kept for diagnostics.
    Output(&'a str),
    Begin,
    End,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Colon,
    Comma,
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let punct = match self {
            Token::Newline => return write!(f, "line break"),
            Token::Identifier(s) => return write!(f, "identifier `{}`", s),
            Token::Int(s) | Token::Float(s) => return write!(f, "number `{}`", s),
            Token::SingleQuoted(s) | Token::DoubleQuoted(s) => return write!(f, "string {}", s),
            Token::Output(s) => return write!(f, "`{}`", s),
            Token::True => "true",
            Token::False => "false",
            Token::Equal => "==",
            Token::NotEqual => "<>",
            Token::GreaterEqual => ">=",
            Token::LessEqual => "<=",
            Token::Greater => ">",
            Token::Less => "<",
            Token::Assign => "=",
            Token::If => "IF",
            Token::Then => "THEN",
            Token::Else => "ELSE",
            Token::EndIf => "ENDIF",
            Token::While => "WHILE",
            Token::EndWhile => "ENDWHILE",
            Token::Repeat => "REPEAT",
            Token::Until => "UNTIL",
            Token::For => "FOR",
            Token::To => "TO",
            Token::Step => "STEP",
            Token::Next => "NEXT",
            Token::Begin => "BEGIN",
            Token::End => "END",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::Colon => ":",
            Token::Comma => ",",
        };
        write!(f, "`{}`", punct)
    }
}

/// A token together with the source line it starts on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lexeme<'a> {
    pub token: Token<'a>,
    pub line: usize,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("line {line}: unrecognised input `{text}`")]
pub struct LexError {
    pub line: usize,
    pub text: String,
}

pub fn lex(text: &str) -> Result<Vec<Lexeme<'_>>, LexError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut iter = LogosToken::lexer(text);
    while let Some(token) = iter.next() {
        let slice = iter.slice();
        let token = match token {
            LogosToken::Newline => Token::Newline,
            LogosToken::True => Token::True,
            LogosToken::False => Token::False,
            LogosToken::If => Token::If,
            LogosToken::Then => Token::Then,
            LogosToken::Else => Token::Else,
            LogosToken::EndIf => Token::EndIf,
            LogosToken::While => Token::While,
            LogosToken::EndWhile => Token::EndWhile,
            LogosToken::Repeat => Token::Repeat,
            LogosToken::Until => Token::Until,
            LogosToken::For => Token::For,
            LogosToken::To => Token::To,
            LogosToken::Step => Token::Step,
            LogosToken::Next => Token::Next,
            LogosToken::Output => Token::Output(slice),
            LogosToken::Begin => Token::Begin,
            LogosToken::End => Token::End,
            LogosToken::SingleQuoted => Token::SingleQuoted(slice),
            LogosToken::DoubleQuoted => Token::DoubleQuoted(slice),
            LogosToken::Identifier => Token::Identifier(slice),
            LogosToken::Float => Token::Float(slice),
            LogosToken::Int => Token::Int(slice),
            LogosToken::Equal => Token::Equal,
            LogosToken::NotEqual => Token::NotEqual,
            LogosToken::GreaterEqual => Token::GreaterEqual,
            LogosToken::LessEqual => Token::LessEqual,
            LogosToken::Greater => Token::Greater,
            LogosToken::Less => Token::Less,
            LogosToken::Assign => Token::Assign,
            LogosToken::Plus => Token::Plus,
            LogosToken::Minus => Token::Minus,
            LogosToken::Star => Token::Star,
            LogosToken::Slash => Token::Slash,
            LogosToken::LParen => Token::LParen,
            LogosToken::RParen => Token::RParen,
            LogosToken::LBracket => Token::LBracket,
            LogosToken::RBracket => Token::RBracket,
            LogosToken::Colon => Token::Colon,
            LogosToken::Comma => Token::Comma,
            LogosToken::Error => {
                return Err(LexError {
                    line,
                    text: slice.to_string(),
                })
            }
        };
        tokens.push(Lexeme { token, line });
        if token == Token::Newline {
            line += slice.matches('\n').count();
        }
    }
    trace!("lexed {} tokens over {} lines", tokens.len(), line);
    Ok(tokens)
}

pub type Name = LocalIntern<String>;

pub fn intern(name: &str) -> Name {
    LocalIntern::new(name.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    fn precedence(self) -> u8 {
        match self {
            ArithOp::Add | ArithOp::Sub => 1,
            ArithOp::Mul | ArithOp::Div => 2,
        }
    }
}

impl Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Eq => "==",
            Comparison::Ne => "<>",
            Comparison::Ge => ">=",
            Comparison::Gt => ">",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    /// `true` / `false`; evaluates to text, not to a boolean.
    Bool(bool),
    Str(String),
    Var(Name),
    Concat(Box<Expr>, Box<Expr>),
    Binary {
        op: ArithOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Negate(Box<Expr>),
    Compare {
        op: Comparison,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    If {
        condition: Expr,
        then: Vec<Statement>,
        otherwise: Option<Vec<Statement>>,
    },
    For {
        var: Name,
        start: Expr,
        end: Expr,
        step: Option<Expr>,
        body: Vec<Statement>,
        /// The identifier after `NEXT`.
        closing: Name,
    },
    While {
        condition: Expr,
        body: Vec<Statement>,
    },
    RepeatUntil {
        body: Vec<Statement>,
        condition: Expr,
    },
    Assign {
        name: Name,
        value: Expr,
    },
    Output(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Statement>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("line {line}: expected {expected}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
        line: usize,
    },
    #[error("expected {expected}, found end of input")]
    UnexpectedEnd { expected: &'static str },
    #[error("line {line}: number `{literal}` is out of range")]
    NumberOutOfRange { literal: String, line: usize },
}

type PResult<T> = Result<T, ParseError>;

pub fn parse(tokens: &[Lexeme]) -> PResult<Program> {
    let mut parser = Parser { tokens, pos: 0 };
    let program = parser.program()?;
    trace!("parsed {:#?}", program);
    Ok(program)
}

struct Parser<'t, 'a> {
    tokens: &'t [Lexeme<'a>],
    pos: usize,
}

fn starts_statement(token: Token) -> bool {
    matches!(
        token,
        Token::If
            | Token::For
            | Token::While
            | Token::Repeat
            | Token::Identifier(_)
            | Token::Output(_)
    )
}

fn arith_op(token: Token) -> Option<ArithOp> {
    match token {
        Token::Plus => Some(ArithOp::Add),
        Token::Minus => Some(ArithOp::Sub),
        Token::Star => Some(ArithOp::Mul),
        Token::Slash => Some(ArithOp::Div),
        _ => None,
    }
}

impl<'t, 'a> Parser<'t, 'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<Token<'a>> {
        self.tokens.get(self.pos + n).map(|l| l.token)
    }

    fn line(&self) -> usize {
        self.tokens.get(self.pos).map_or(0, |l| l.line)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(lexeme) => ParseError::Unexpected {
                expected,
                found: lexeme.token.to_string(),
                line: lexeme.line,
            },
            None => ParseError::UnexpectedEnd { expected },
        }
    }

    fn expect(&mut self, token: Token<'a>, expected: &'static str) -> PResult<()> {
        if self.peek() == Some(token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn identifier(&mut self) -> PResult<Name> {
        match self.peek() {
            Some(Token::Identifier(name)) => {
                self.pos += 1;
                Ok(intern(name))
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    // BEGIN NEWLINE body NEWLINE END NEWLINE?
    fn program(&mut self) -> PResult<Program> {
        self.expect(Token::Begin, "BEGIN")?;
        self.expect(Token::Newline, "a line break after BEGIN")?;
        let body = self.body()?;
        self.expect(Token::Newline, "a line break before END")?;
        self.expect(Token::End, "END")?;
        if self.peek() == Some(Token::Newline) {
            self.pos += 1;
        }
        if self.peek().is_some() {
            return Err(self.unexpected("end of input after END"));
        }
        Ok(Program { body })
    }

    /// One or more statements separated by line breaks. The line break that
    /// closes the body is left for the enclosing production.
    fn body(&mut self) -> PResult<Vec<Statement>> {
        let mut statements = vec![self.statement()?];
        while self.peek() == Some(Token::Newline)
            && self.peek_nth(1).map_or(false, starts_statement)
        {
            self.pos += 1;
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    fn statement(&mut self) -> PResult<Statement> {
        match self.peek() {
            Some(Token::If) => self.if_statement(),
            Some(Token::For) => self.for_loop(),
            Some(Token::While) => self.while_loop(),
            Some(Token::Repeat) => self.repeat_until(),
            Some(Token::Identifier(_)) => {
                let (name, value) = self.assignment()?;
                Ok(Statement::Assign { name, value })
            }
            Some(Token::Output(_)) => self.output(),
            _ => Err(self.unexpected("a statement")),
        }
    }

    fn if_statement(&mut self) -> PResult<Statement> {
        self.expect(Token::If, "IF")?;
        let condition = self.condition()?;
        self.expect(Token::Then, "THEN")?;
        self.expect(Token::Newline, "a line break after THEN")?;
        let then = self.body()?;
        self.expect(Token::Newline, "a line break")?;
        let otherwise = if self.peek() == Some(Token::Else) {
            self.pos += 1;
            self.expect(Token::Newline, "a line break after ELSE")?;
            let otherwise = self.body()?;
            self.expect(Token::Newline, "a line break")?;
            Some(otherwise)
        } else {
            None
        };
        self.expect(Token::EndIf, "ENDIF")?;
        Ok(Statement::If {
            condition,
            then,
            otherwise,
        })
    }

    fn for_loop(&mut self) -> PResult<Statement> {
        self.expect(Token::For, "FOR")?;
        let (var, start) = self.assignment()?;
        self.expect(Token::To, "TO")?;
        let end = self.expr()?;
        let step = if self.peek() == Some(Token::Step) {
            self.pos += 1;
            Some(self.expr()?)
        } else {
            None
        };
        self.expect(Token::Newline, "a line break after the loop header")?;
        let body = self.body()?;
        self.expect(Token::Newline, "a line break")?;
        self.expect(Token::Next, "NEXT")?;
        let closing = self.identifier()?;
        Ok(Statement::For {
            var,
            start,
            end,
            step,
            body,
            closing,
        })
    }

    fn while_loop(&mut self) -> PResult<Statement> {
        self.expect(Token::While, "WHILE")?;
        let condition = self.condition()?;
        self.expect(Token::Newline, "a line break after the condition")?;
        let body = self.body()?;
        self.expect(Token::Newline, "a line break")?;
        self.expect(Token::EndWhile, "ENDWHILE")?;
        Ok(Statement::While { condition, body })
    }

    fn repeat_until(&mut self) -> PResult<Statement> {
        self.expect(Token::Repeat, "REPEAT")?;
        self.expect(Token::Newline, "a line break after REPEAT")?;
        let body = self.body()?;
        self.expect(Token::Newline, "a line break")?;
        self.expect(Token::Until, "UNTIL")?;
        let condition = self.condition()?;
        Ok(Statement::RepeatUntil { body, condition })
    }

    // IDENTIFIER '=' (expr | string)
    fn assignment(&mut self) -> PResult<(Name, Expr)> {
        let name = self.identifier()?;
        self.expect(Token::Assign, "`=`")?;
        let value = match self.peek() {
            Some(Token::SingleQuoted(_) | Token::DoubleQuoted(_)) => self.string()?,
            _ => self.expr()?,
        };
        Ok((name, value))
    }

    // OUTPUT (expr | string | boolean)
    fn output(&mut self) -> PResult<Statement> {
        self.pos += 1;
        let value = match self.peek() {
            Some(Token::True) => {
                self.pos += 1;
                Expr::Bool(true)
            }
            Some(Token::False) => {
                self.pos += 1;
                Expr::Bool(false)
            }
            Some(Token::SingleQuoted(_) | Token::DoubleQuoted(_)) => self.string()?,
            _ => self.expr()?,
        };
        Ok(Statement::Output(value))
    }

    // expr comparison expr, never chained
    fn condition(&mut self) -> PResult<Expr> {
        let left = self.expr()?;
        let op = match self.peek() {
            Some(Token::Less) => Comparison::Lt,
            Some(Token::LessEqual) => Comparison::Le,
            Some(Token::Equal) => Comparison::Eq,
            Some(Token::NotEqual) => Comparison::Ne,
            Some(Token::GreaterEqual) => Comparison::Ge,
            Some(Token::Greater) => Comparison::Gt,
            _ => return Err(self.unexpected("a comparison operator")),
        };
        self.pos += 1;
        let right = self.expr()?;
        Ok(Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn expr(&mut self) -> PResult<Expr> {
        self.binary(0)
    }

    fn binary(&mut self, min_precedence: u8) -> PResult<Expr> {
        let mut left = self.unary()?;
        while let Some(op) = self.peek().and_then(arith_op) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            // left-associative: the right operand only takes tighter operators
            let right = self.binary(precedence + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> PResult<Expr> {
        if self.peek() == Some(Token::Minus) {
            self.pos += 1;
            Ok(Expr::Negate(Box::new(self.unary()?)))
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> PResult<Expr> {
        let line = self.line();
        let out_of_range = |literal: &str| ParseError::NumberOutOfRange {
            literal: literal.to_string(),
            line,
        };
        let expr = match self.peek() {
            Some(Token::Identifier(name)) => Expr::Var(intern(name)),
            Some(Token::Int(digits)) => Expr::Int(digits.parse().map_err(|_| out_of_range(digits))?),
            Some(Token::Float(digits)) => {
                Expr::Float(digits.parse().map_err(|_| out_of_range(digits))?)
            }
            _ => return Err(self.unexpected("an expression")),
        };
        self.pos += 1;
        Ok(expr)
    }

    // string ('+' string)*, literals only
    fn string(&mut self) -> PResult<Expr> {
        let mut left = self.string_literal()?;
        while self.peek() == Some(Token::Plus) {
            self.pos += 1;
            let right = self.string_literal()?;
            left = Expr::Concat(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn string_literal(&mut self) -> PResult<Expr> {
        match self.peek() {
            Some(Token::SingleQuoted(quoted) | Token::DoubleQuoted(quoted)) => {
                self.pos += 1;
                Ok(Expr::Str(quoted[1..quoted.len() - 1].to_string()))
            }
            _ => Err(self.unexpected("a string literal")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token<'_>> {
        lex(text).unwrap().into_iter().map(|l| l.token).collect()
    }

    fn parse_str(text: &str) -> PResult<Program> {
        parse(&lex(text).unwrap())
    }

    fn body_of(text: &str) -> Vec<Statement> {
        parse_str(text).unwrap().body
    }

    #[test]
    fn keywords_only_match_whole_words() {
        assert_eq!(
            tokens("IF IFFY Print Display print true trueish"),
            vec![
                Token::If,
                Token::Identifier("IFFY"),
                Token::Output("Print"),
                Token::Output("Display"),
                Token::Identifier("print"),
                Token::True,
                Token::Identifier("trueish"),
            ]
        );
    }

    #[test]
    fn longest_operator_and_number_win() {
        assert_eq!(
            tokens("<> <= < == = >= > 3.25 7 9."),
            vec![
                Token::NotEqual,
                Token::LessEqual,
                Token::Less,
                Token::Equal,
                Token::Assign,
                Token::GreaterEqual,
                Token::Greater,
                Token::Float("3.25"),
                Token::Int("7"),
                Token::Float("9."),
            ]
        );
    }

    #[test]
    fn strings_keep_their_quotes() {
        assert_eq!(
            tokens(r#"'it' "is""#),
            vec![Token::SingleQuoted("'it'"), Token::DoubleQuoted("\"is\"")]
        );
    }

    #[test]
    fn newline_runs_collapse_and_count_lines() {
        let lexed = lex("BEGIN\n\n\r\nx = 1\nEND").unwrap();
        let lines: Vec<_> = lexed.iter().map(|l| (l.token, l.line)).collect();
        assert_eq!(
            lines,
            vec![
                (Token::Begin, 1),
                (Token::Newline, 1),
                (Token::Identifier("x"), 4),
                (Token::Assign, 4),
                (Token::Int("1"), 4),
                (Token::Newline, 4),
                (Token::End, 5),
            ]
        );
    }

    #[test]
    fn indented_blank_lines_are_one_line_break() {
        let lexed = lex("Print 1\n    \n\t\r\nPrint 2\n  END").unwrap();
        let lines: Vec<_> = lexed.iter().map(|l| (l.token, l.line)).collect();
        assert_eq!(
            lines,
            vec![
                (Token::Output("Print"), 1),
                (Token::Int("1"), 1),
                (Token::Newline, 1),
                (Token::Output("Print"), 4),
                (Token::Int("2"), 4),
                (Token::Newline, 4),
                (Token::End, 5),
            ]
        );
    }

    #[test]
    fn unmatched_input_is_a_lex_error() {
        let err = lex("BEGIN\nx = 1 # 2\nEND").unwrap_err();
        assert_eq!(
            err,
            LexError {
                line: 2,
                text: "#".to_string()
            }
        );
    }

    #[test]
    fn multiplication_binds_tighter_and_minus_is_left_associative() {
        let body = body_of("BEGIN\nx = 1 - 2 - 3 * -4\nEND");
        let expected = Expr::Binary {
            op: ArithOp::Sub,
            left: Box::new(Expr::Binary {
                op: ArithOp::Sub,
                left: Box::new(Expr::Int(1)),
                right: Box::new(Expr::Int(2)),
            }),
            right: Box::new(Expr::Binary {
                op: ArithOp::Mul,
                left: Box::new(Expr::Int(3)),
                right: Box::new(Expr::Negate(Box::new(Expr::Int(4)))),
            }),
        };
        assert_eq!(
            body,
            vec![Statement::Assign {
                name: intern("x"),
                value: expected
            }]
        );
    }

    #[test]
    fn unary_minus_binds_tightest() {
        let body = body_of("BEGIN\nPrint -a * b\nEND");
        assert_eq!(
            body,
            vec![Statement::Output(Expr::Binary {
                op: ArithOp::Mul,
                left: Box::new(Expr::Negate(Box::new(Expr::Var(intern("a"))))),
                right: Box::new(Expr::Var(intern("b"))),
            })]
        );
    }

    #[test]
    fn both_quote_styles_build_string_nodes() {
        let body = body_of("BEGIN\nPrint 'a' + \"b\"\nEND");
        assert_eq!(
            body,
            vec![Statement::Output(Expr::Concat(
                Box::new(Expr::Str("a".to_string())),
                Box::new(Expr::Str("b".to_string())),
            ))]
        );
    }

    #[test]
    fn for_loop_with_step_and_closing_name() {
        let body = body_of("BEGIN\nFOR i = 1 TO 5 STEP 2\nPrint i\nNEXT j\nEND\n");
        assert_eq!(
            body,
            vec![Statement::For {
                var: intern("i"),
                start: Expr::Int(1),
                end: Expr::Int(5),
                step: Some(Expr::Int(2)),
                body: vec![Statement::Output(Expr::Var(intern("i")))],
                closing: intern("j"),
            }]
        );
    }

    #[test]
    fn if_else_with_multi_statement_bodies() {
        let body = body_of(
            "BEGIN\nIF x >= 2 THEN\nPrint 1\n\nPrint 2\nELSE\nPrint false\nENDIF\nPrint 3\nEND",
        );
        assert_eq!(body.len(), 2);
        match &body[0] {
            Statement::If {
                condition: Expr::Compare { op, .. },
                then,
                otherwise: Some(otherwise),
            } => {
                assert_eq!(*op, Comparison::Ge);
                assert_eq!(then.len(), 2);
                assert_eq!(otherwise, &vec![Statement::Output(Expr::Bool(false))]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn loops_parse() {
        let body = body_of(
            "BEGIN\nWHILE n < 3\nn = n + 1\nENDWHILE\nREPEAT\nn = n - 1\nUNTIL n == 0\nEND",
        );
        assert!(matches!(body[0], Statement::While { .. }));
        assert!(matches!(body[1], Statement::RepeatUntil { .. }));
    }

    #[test]
    fn chained_comparison_is_rejected() {
        let err = parse_str("BEGIN\nIF 1 < 2 < 3 THEN\nPrint 1\nENDIF\nEND").unwrap_err();
        assert_eq!(
            err,
            ParseError::Unexpected {
                expected: "THEN",
                found: "`<`".to_string(),
                line: 2,
            }
        );
    }

    #[test]
    fn boolean_literal_is_not_a_condition() {
        let err = parse_str("BEGIN\nIF false THEN\nPrint 1\nENDIF\nEND").unwrap_err();
        assert_eq!(
            err,
            ParseError::Unexpected {
                expected: "an expression",
                found: "`false`".to_string(),
                line: 2,
            }
        );
        assert!(parse_str("BEGIN\nWHILE true\nPrint 1\nENDWHILE\nEND").is_err());
    }

    #[test]
    fn malformed_programs_are_rejected() {
        for source in [
            "",
            "Print 1",
            "BEGIN\nEND",
            "BEGIN\nPrint 1\n",
            "BEGIN\nPrint 1 END",
            "BEGIN\nPrint 1\nEND\nPrint 2",
            "BEGIN\nx = 'a' + 1\nEND",
            "BEGIN\nPrint true + 1\nEND",
            "BEGIN\nx = (1)\nEND",
            "BEGIN\nFOR i = 1 TO 3\nPrint i\nNEXT\nEND",
            "BEGIN\nx = 99999999999999999999\nEND",
        ] {
            assert!(parse_str(source).is_err(), "accepted {:?}", source);
        }
    }
}
