use std::fmt;

use crate::diagnostics::{Span, SyntaxError};
use crate::lexer::{lex, Token, TokenKind};

/// Surface expression tree. Nodes are built once by the parser and shared
/// read-only by type inference and evaluation.
#[derive(Debug, Clone)]
pub enum Expr {
    Number {
        value: i64,
        span: Span,
    },
    Boolean {
        value: bool,
        span: Span,
    },
    Var {
        name: String,
        span: Span,
    },
    Lambda {
        binder: String,
        body: Box<Expr>,
        span: Span,
    },
    Apply {
        func: Box<Expr>,
        arg: Box<Expr>,
        span: Span,
    },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        span: Span,
    },
    Let {
        recursive: bool,
        binder: String,
        bound: Box<Expr>,
        body: Box<Expr>,
        span: Span,
    },
    List {
        items: Vec<Expr>,
        span: Span,
    },
}

pub fn expr_span(expr: &Expr) -> Span {
    match expr {
        Expr::Number { span, .. }
        | Expr::Boolean { span, .. }
        | Expr::Var { span, .. }
        | Expr::Lambda { span, .. }
        | Expr::Apply { span, .. }
        | Expr::If { span, .. }
        | Expr::Let { span, .. }
        | Expr::List { span, .. } => span.clone(),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number { value, .. } => write!(f, "{value}"),
            Expr::Boolean { value, .. } => write!(f, "{value}"),
            Expr::Var { name, .. } => write!(f, "{name}"),
            Expr::Lambda { binder, body, .. } => write!(f, "\\{binder} -> {body}"),
            Expr::Apply { func, arg, .. } => {
                if is_atom(func) || matches!(func.as_ref(), Expr::Apply { .. }) {
                    write!(f, "{func} ")?;
                } else {
                    write!(f, "({func}) ")?;
                }
                if is_atom(arg) {
                    write!(f, "{arg}")
                } else {
                    write!(f, "({arg})")
                }
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => write!(f, "if {cond} then {then_branch} else {else_branch}"),
            Expr::Let {
                recursive,
                binder,
                bound,
                body,
                ..
            } => {
                let keyword = if *recursive { "let rec" } else { "let" };
                write!(f, "{keyword} {binder} = {bound} in {body}")
            }
            Expr::List { items, .. } => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

fn is_atom(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Number { .. } | Expr::Boolean { .. } | Expr::Var { .. } | Expr::List { .. }
    )
}

/// Parse a single expression from source text. The whole input must be
/// consumed; trailing tokens are a syntax error.
pub fn parse_expression(source: &str) -> Result<Expr, SyntaxError> {
    let tokens = lex(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_operator_expr(0)?;
    let trailing = parser.peek();
    if trailing.kind != TokenKind::Eof {
        return Err(SyntaxError {
            message: format!("expected end of input, found {}", describe(trailing)),
            span: trailing.span.clone(),
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, SyntaxError> {
        let token = self.peek().clone();
        if token.kind == kind {
            Ok(self.advance())
        } else {
            Err(SyntaxError {
                message: format!("expected {what}, found {}", describe(&token)),
                span: token.span,
            })
        }
    }

    /// Precedence climbing over binary operators. Operator uses desugar to
    /// applications of the builtin names, so `a + b` parses as
    /// `(add a) b` with the operator token's span on the `add` node.
    fn parse_operator_expr(&mut self, min_binding_power: u8) -> Result<Expr, SyntaxError> {
        let mut lhs = self.parse_application()?;
        loop {
            let token = self.peek().clone();
            if token.kind != TokenKind::Operator {
                break;
            }
            let Some((left_bp, right_bp)) = binding_power(&token.text) else {
                return Err(SyntaxError {
                    message: format!("unknown operator '{}'", token.text),
                    span: token.span,
                });
            };
            if left_bp < min_binding_power {
                break;
            }
            self.advance();
            let func = Expr::Var {
                name: builtin_for_operator(&token.text).to_string(),
                span: token.span.clone(),
            };
            let rhs = self.parse_operator_expr(right_bp)?;
            let span = Span {
                start: expr_span(&lhs).start,
                end: expr_span(&rhs).end,
            };
            let inner_span = Span {
                start: expr_span(&lhs).start,
                end: token.span.end.clone(),
            };
            lhs = Expr::Apply {
                func: Box::new(Expr::Apply {
                    func: Box::new(func),
                    arg: Box::new(lhs),
                    span: inner_span,
                }),
                arg: Box::new(rhs),
                span,
            };
        }
        Ok(lhs)
    }

    /// A run of atoms folds into left-associated applications: `f x y`
    /// parses as `(f x) y`.
    fn parse_application(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.peek().clone();
        if !starts_atom(token.kind) {
            return Err(SyntaxError {
                message: format!("expected expression, found {}", describe(&token)),
                span: token.span,
            });
        }
        let mut expr = self.parse_atom()?;
        while starts_atom(self.peek().kind) {
            let arg = self.parse_atom()?;
            let span = Span {
                start: expr_span(&expr).start,
                end: expr_span(&arg).end,
            };
            expr = Expr::Apply {
                func: Box::new(expr),
                arg: Box::new(arg),
                span,
            };
        }
        Ok(expr)
    }

    fn parse_atom(&mut self) -> Result<Expr, SyntaxError> {
        match self.peek().kind {
            TokenKind::Number => self.parse_number(),
            TokenKind::Boolean => self.parse_boolean(),
            TokenKind::Ident => self.parse_var(),
            TokenKind::LeftParen => self.parse_parenthesized(),
            TokenKind::Lambda => self.parse_lambda(),
            TokenKind::If => self.parse_if(),
            TokenKind::Let => self.parse_let(),
            TokenKind::LeftBracket => self.parse_list(),
            _ => {
                let token = self.peek().clone();
                Err(SyntaxError {
                    message: format!("expected expression, found {}", describe(&token)),
                    span: token.span,
                })
            }
        }
    }

    fn parse_number(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.expect(TokenKind::Number, "number")?;
        let value = token.text.parse::<i64>().map_err(|_| SyntaxError {
            message: format!("integer literal '{}' is out of range", token.text),
            span: token.span.clone(),
        })?;
        Ok(Expr::Number {
            value,
            span: token.span,
        })
    }

    fn parse_boolean(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.expect(TokenKind::Boolean, "boolean")?;
        Ok(Expr::Boolean {
            value: token.text == "true",
            span: token.span,
        })
    }

    fn parse_var(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.expect(TokenKind::Ident, "identifier")?;
        Ok(Expr::Var {
            name: token.text,
            span: token.span,
        })
    }

    fn parse_parenthesized(&mut self) -> Result<Expr, SyntaxError> {
        self.expect(TokenKind::LeftParen, "opening paren")?;
        let expr = self.parse_operator_expr(0)?;
        self.expect(TokenKind::RightParen, "closing paren")?;
        Ok(expr)
    }

    fn parse_lambda(&mut self) -> Result<Expr, SyntaxError> {
        let lambda = self.expect(TokenKind::Lambda, "lambda")?;
        let binder = self.expect(TokenKind::Ident, "binder")?;
        self.expect(TokenKind::RightArrow, "'->'")?;
        let body = self.parse_operator_expr(0)?;
        let span = Span {
            start: lambda.span.start,
            end: expr_span(&body).end,
        };
        Ok(Expr::Lambda {
            binder: binder.text,
            body: Box::new(body),
            span,
        })
    }

    fn parse_if(&mut self) -> Result<Expr, SyntaxError> {
        let if_token = self.expect(TokenKind::If, "'if'")?;
        let cond = self.parse_operator_expr(0)?;
        self.expect(TokenKind::Then, "'then'")?;
        let then_branch = self.parse_operator_expr(0)?;
        self.expect(TokenKind::Else, "'else'")?;
        let else_branch = self.parse_operator_expr(0)?;
        let span = Span {
            start: if_token.span.start,
            end: expr_span(&else_branch).end,
        };
        Ok(Expr::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
            span,
        })
    }

    fn parse_let(&mut self) -> Result<Expr, SyntaxError> {
        let let_token = self.expect(TokenKind::Let, "'let'")?;
        let recursive = if self.peek().kind == TokenKind::Rec {
            self.advance();
            true
        } else {
            false
        };
        let binder = self.expect(TokenKind::Ident, "binder")?;
        self.expect(TokenKind::Equals, "'='")?;
        let bound = self.parse_operator_expr(0)?;
        self.expect(TokenKind::In, "'in'")?;
        let body = self.parse_operator_expr(0)?;
        let span = Span {
            start: let_token.span.start,
            end: expr_span(&body).end,
        };
        Ok(Expr::Let {
            recursive,
            binder: binder.text,
            bound: Box::new(bound),
            body: Box::new(body),
            span,
        })
    }

    fn parse_list(&mut self) -> Result<Expr, SyntaxError> {
        let open = self.expect(TokenKind::LeftBracket, "opening bracket")?;
        let mut items = Vec::new();
        if self.peek().kind != TokenKind::RightBracket {
            items.push(self.parse_operator_expr(0)?);
            while self.peek().kind == TokenKind::Comma {
                self.advance();
                items.push(self.parse_operator_expr(0)?);
            }
        }
        let close = self.expect(TokenKind::RightBracket, "closing bracket")?;
        Ok(Expr::List {
            items,
            span: Span {
                start: open.span.start,
                end: close.span.end,
            },
        })
    }
}

fn starts_atom(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Number
            | TokenKind::Boolean
            | TokenKind::Ident
            | TokenKind::LeftParen
            | TokenKind::Lambda
            | TokenKind::If
            | TokenKind::Let
            | TokenKind::LeftBracket
    )
}

fn binding_power(operator: &str) -> Option<(u8, u8)> {
    match operator {
        "==" => Some((1, 2)),
        "+" | "-" => Some((2, 3)),
        "*" => Some((3, 4)),
        _ => None,
    }
}

fn builtin_for_operator(operator: &str) -> &'static str {
    match operator {
        "+" => "add",
        "-" => "subtract",
        "*" => "multiply",
        _ => "equals",
    }
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Eof => "end of input".to_string(),
        _ => format!("'{}'", token.text),
    }
}
