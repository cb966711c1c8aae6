//  GUARD.rs
//    by Lut99
//
//  Description:
//!   Implements [`Guard`], the opaque boolean expression attached to actions and deontic
//!   tokens, and the small expression grammar it is parsed with. The grammar is fixed and
//!   parsed once at construction time rather than re-parsed on every evaluation.
//
//  # Grammar
//  ```text
//  expr       := or_expr
//  or_expr    := and_expr ( ("or" | "||") and_expr )*
//  and_expr   := not_expr ( ("and" | "&&") not_expr )*
//  not_expr   := ("not" | "!")? comparison
//  comparison := additive ( ("==" | "!=" | "<=" | ">=" | "<" | ">") additive )?
//  additive   := primary (("+" | "-") primary)*
//  primary    := literal | call | path | "(" expr ")"
//  call       := ident "(" (expr ("," expr)*)? ")"
//  path       := ident ("." ident)*
//  literal    := number | string | "true" | "false"
//  ```
//

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FResult};

use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, tag, take_while, take_while1};
use nom::character::complete::{char, digit1, multispace0, none_of, one_of};
use nom::combinator::{cut, map, opt, recognize, value};
use nom::multi::{many0, separated_list0};
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::{IResult, Parser};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::Value;


/***** ERRORS *****/
/// Errors that can occur while [parsing](Guard::parse) a guard expression.
///
/// Raised at construction time: a malformed guard expression is a model-loading error, not
/// something that should surface as a failed evaluation later.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The expression could not be parsed at all.
    #[error("failed to parse guard expression {raw:?}: {reason}")]
    Malformed { raw: String, reason: String },
    /// The expression was parsed, but trailing input remained.
    #[error("trailing input after guard expression {raw:?}: {trailing:?}")]
    TrailingInput { raw: String, trailing: String },
}

/// Errors that can occur while [evaluating](Guard::evaluate) a parsed guard expression.
///
/// These never escape [`Guard::evaluate`]: any evaluation error is caught and folded to `false`.
/// The type exists so that callers who do want the diagnostic (logging, tests) can reach it via
/// [`Guard::try_evaluate`].
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("unknown identifier '{name}'")]
    UnknownIdentifier { name: String },
    #[error("unknown domain function '{name}'")]
    UnknownFunction { name: String },
    #[error("value {on} has no field '{field}'")]
    UnknownField { on: String, field: String },
    #[error("type mismatch in '{op}': {lhs} and {rhs}")]
    TypeMismatch { op: String, lhs: String, rhs: String },
}


/***** AST *****/
/// A comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Le,
    Ge,
    Lt,
    Gt,
}

/// The parsed abstract syntax tree of a guard expression.
#[derive(Clone, Debug, PartialEq)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare(Box<Expr>, CmpOp, Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
    Path(Vec<String>),
    Number(f64),
    Str(String),
    Bool(bool),
}


/***** PARSING *****/
/// Wraps a parser, consuming any leading whitespace first.
fn ws<'a, O>(mut inner: impl Parser<&'a str, O, nom::error::Error<&'a str>>) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    move |input: &'a str| {
        let (input, _) = multispace0(input)?;
        inner.parse(input)
    }
}

fn ident(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(alt((tag("_"), take_while1(|c: char| c.is_alphabetic()))), take_while(|c: char| c.is_alphanumeric() || c == '_'))),
        |s: &str| s.to_string(),
    )(input)
}

fn number(input: &str) -> IResult<&str, f64> {
    map(recognize(tuple((opt(char('-')), digit1, opt(pair(char('.'), digit1))))), |s: &str| s.parse::<f64>().unwrap_or(0.0))(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(opt(escaped_transform(none_of("\"\\"), '\\', alt((value("\\", tag("\\")), value("\"", tag("\"")), value("\n", tag("n")))))), |s| {
            s.unwrap_or_default()
        }),
        char('"'),
    )(input)
}

fn path(input: &str) -> IResult<&str, Vec<String>> {
    map(pair(ident, many0(preceded(char('.'), ident))), |(head, mut rest)| {
        let mut segments = vec![head];
        segments.append(&mut rest);
        segments
    })(input)
}

fn call_or_path(input: &str) -> IResult<&str, Expr> {
    let (input, segments) = path(input)?;
    if segments.len() == 1 {
        if let Ok((rest, args)) = preceded(ws(char('(')), cut(pair(separated_list0(ws(char(',')), ws(expr)), ws(char(')')))))(input) {
            return Ok((rest, Expr::Call(segments[0].clone(), args.0)));
        }
    }
    Ok((input, Expr::Path(segments)))
}

fn primary(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        delimited(char('('), ws(expr), ws(char(')'))),
        value(Expr::Bool(true), tag("true")),
        value(Expr::Bool(false), tag("false")),
        map(number, Expr::Number),
        map(string_literal, Expr::Str),
        call_or_path,
    )))(input)
}

fn additive(input: &str) -> IResult<&str, Expr> {
    let (input, first) = primary(input)?;
    let (input, rest) = many0(pair(ws(alt((char('+'), char('-')))), primary))(input)?;
    Ok((
        input,
        rest.into_iter().fold(first, |acc, (op, rhs)| if op == '+' { Expr::Add(Box::new(acc), Box::new(rhs)) } else { Expr::Sub(Box::new(acc), Box::new(rhs)) }),
    ))
}

fn comparison(input: &str) -> IResult<&str, Expr> {
    let (input, lhs) = additive(input)?;
    let op = alt((
        value(CmpOp::Eq, tag("==")),
        value(CmpOp::Ne, tag("!=")),
        value(CmpOp::Le, tag("<=")),
        value(CmpOp::Ge, tag(">=")),
        value(CmpOp::Lt, tag("<")),
        value(CmpOp::Gt, tag(">")),
    ));
    let (input, maybe) = opt(pair(ws(op), additive))(input)?;
    Ok((input, match maybe { Some((op, rhs)) => Expr::Compare(Box::new(lhs), op, Box::new(rhs)), None => lhs }))
}

fn not_expr(input: &str) -> IResult<&str, Expr> {
    let (input, negate) = opt(ws(alt((tag("not"), tag("!")))))(input)?;
    let (input, inner) = comparison(input)?;
    Ok((input, if negate.is_some() { Expr::Not(Box::new(inner)) } else { inner }))
}

fn and_expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = not_expr(input)?;
    let (input, rest) = many0(preceded(ws(alt((tag("and"), tag("&&")))), not_expr))(input)?;
    Ok((input, rest.into_iter().fold(first, |acc, rhs| Expr::And(Box::new(acc), Box::new(rhs)))))
}

fn or_expr(input: &str) -> IResult<&str, Expr> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(ws(alt((tag("or"), tag("||")))), and_expr))(input)?;
    Ok((input, rest.into_iter().fold(first, |acc, rhs| Expr::Or(Box::new(acc), Box::new(rhs)))))
}

fn expr(input: &str) -> IResult<&str, Expr> { or_expr(input) }


/***** CONTEXT *****/
/// Allows a [`Guard`] to call out to named domain functions during evaluation without coupling
/// `guard.rs` to the engine's own function-registry type.
pub trait FunctionContext {
    /// Calls the named domain function with the given evaluated arguments.
    ///
    /// Returns `None` if no function with that name is registered.
    fn call(&self, name: &str, args: &[Value]) -> Option<Value>;
}

/// The named bindings and domain-function context a [`Guard`] is evaluated against.
pub struct Context<'a> {
    bindings:  HashMap<String, Value>,
    functions: &'a dyn FunctionContext,
}
impl<'a> Context<'a> {
    /// Constructs an empty context backed by the given function registry.
    #[inline]
    pub fn new(functions: &'a dyn FunctionContext) -> Self { Self { bindings: HashMap::new(), functions } }

    /// Binds a name (e.g. `self`, `loan`, a policy value) for this evaluation.
    #[inline]
    pub fn bind(mut self, name: impl Into<String>, value: Value) -> Self {
        self.bindings.insert(name.into(), value);
        self
    }

    /// Binds a name in place.
    #[inline]
    pub fn bind_mut(&mut self, name: impl Into<String>, value: Value) { self.bindings.insert(name.into(), value); }
}


/***** EVALUATION *****/
fn resolve_path(segments: &[String], ctx: &Context) -> Result<Value, EvalError> {
    let mut value = ctx.bindings.get(&segments[0]).cloned().ok_or_else(|| EvalError::UnknownIdentifier { name: segments[0].clone() })?;
    for field in &segments[1..] {
        value = value
            .field(field)
            .ok_or_else(|| EvalError::UnknownField { on: format!("{value}"), field: field.clone() })?;
    }
    Ok(value)
}

fn eval_expr(expr: &Expr, ctx: &Context) -> Result<Value, EvalError> {
    match expr {
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Path(segments) => resolve_path(segments, ctx),
        Expr::Call(name, args) => {
            let args: Vec<Value> = args.iter().map(|a| eval_expr(a, ctx)).collect::<Result<_, _>>()?;
            ctx.functions.call(name, &args).ok_or_else(|| EvalError::UnknownFunction { name: name.clone() })
        }
        Expr::Not(inner) => {
            let v = eval_expr(inner, ctx)?;
            Ok(Value::Bool(!v.as_bool().unwrap_or(false)))
        }
        Expr::And(lhs, rhs) => {
            let l = eval_expr(lhs, ctx)?.as_bool().unwrap_or(false);
            if !l {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(eval_expr(rhs, ctx)?.as_bool().unwrap_or(false)))
        }
        Expr::Or(lhs, rhs) => {
            let l = eval_expr(lhs, ctx)?.as_bool().unwrap_or(false);
            if l {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(eval_expr(rhs, ctx)?.as_bool().unwrap_or(false)))
        }
        Expr::Add(lhs, rhs) => numeric_op(lhs, rhs, ctx, "+", |a, b| a + b),
        Expr::Sub(lhs, rhs) => numeric_op(lhs, rhs, ctx, "-", |a, b| a - b),
        Expr::Compare(lhs, op, rhs) => {
            let l = eval_expr(lhs, ctx)?;
            let r = eval_expr(rhs, ctx)?;
            compare(&l, *op, &r)
        }
    }
}

fn numeric_op(lhs: &Expr, rhs: &Expr, ctx: &Context, symbol: &str, f: impl Fn(f64, f64) -> f64) -> Result<Value, EvalError> {
    let l = eval_expr(lhs, ctx)?;
    let r = eval_expr(rhs, ctx)?;
    match (l.as_number(), r.as_number()) {
        (Some(a), Some(b)) => Ok(Value::Number(f(a, b))),
        _ => Err(EvalError::TypeMismatch { op: symbol.into(), lhs: format!("{l}"), rhs: format!("{r}") }),
    }
}

fn compare(lhs: &Value, op: CmpOp, rhs: &Value) -> Result<Value, EvalError> {
    if let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) {
        return Ok(Value::Bool(match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Le => a <= b,
            CmpOp::Ge => a >= b,
            CmpOp::Lt => a < b,
            CmpOp::Gt => a > b,
        }));
    }
    match op {
        CmpOp::Eq => Ok(Value::Bool(lhs == rhs)),
        CmpOp::Ne => Ok(Value::Bool(lhs != rhs)),
        _ => Err(EvalError::TypeMismatch { op: format!("{op:?}"), lhs: format!("{lhs}"), rhs: format!("{rhs}") }),
    }
}


/***** LIBRARY *****/
/// An opaque boolean expression attached to an action or deontic token, evaluated against a
/// named [`Context`] immediately before the effect it guards is allowed to take place.
///
/// Failure-closed: any evaluation error (unknown identifier, unknown function, type mismatch)
/// is treated as `false`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Guard {
    /// The original source text this guard was parsed from.
    pub raw: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    ast: Option<ExprHandle>,
}

/// Thin wrapper so `Expr` (private) can sit behind a `Clone + Debug + PartialEq` field without
/// becoming part of the public API.
#[derive(Clone, Debug, PartialEq)]
struct ExprHandle(Expr);

impl Guard {
    /// Parses a guard expression from its raw textual form.
    ///
    /// # Errors
    /// Returns [`ParseError`] if `raw` is not a well-formed expression per the grammar in this
    /// module's documentation, or if trailing input remains after a valid expression.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ParseError> {
        let raw = raw.into();
        let (rest, parsed) = expr(&raw).map_err(|e| ParseError::Malformed { raw: raw.clone(), reason: e.to_string() })?;
        let (rest, _) = multispace0::<_, nom::error::Error<&str>>(rest).map_err(|e| ParseError::Malformed { raw: raw.clone(), reason: e.to_string() })?;
        if !rest.is_empty() {
            return Err(ParseError::TrailingInput { raw, trailing: rest.into() });
        }
        Ok(Self { raw, ast: Some(ExprHandle(parsed)) })
    }

    /// Evaluates this guard against the given context.
    ///
    /// Never fails: any [`EvalError`] is caught and folded to `false`. Use
    /// [`Guard::try_evaluate`] to observe the error instead.
    pub fn evaluate(&self, ctx: &Context) -> bool { self.try_evaluate(ctx).unwrap_or(false) }

    /// Evaluates this guard against the given context, surfacing evaluation errors.
    ///
    /// # Errors
    /// Returns [`EvalError`] if the expression references an unbound identifier, an
    /// unregistered function, a nonexistent field, or mismatches types in an arithmetic or
    /// ordered comparison.
    pub fn try_evaluate(&self, ctx: &Context) -> Result<bool, EvalError> {
        let ExprHandle(ast) = self.ast.as_ref().expect("Guard constructed only via parse()");
        Ok(eval_expr(ast, ctx)?.as_bool().unwrap_or(false))
    }
}
impl Display for Guard {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> FResult { write!(f, "{}", self.raw) }
}


/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::runtime::artifact::ArtifactInstance;

    struct NoFunctions;
    impl FunctionContext for NoFunctions {
        fn call(&self, _name: &str, _args: &[Value]) -> Option<Value> { None }
    }

    struct TestFunctions;
    impl FunctionContext for TestFunctions {
        fn call(&self, name: &str, args: &[Value]) -> Option<Value> {
            match name {
                "loanCount" => Some(Value::Number(2.0)),
                "hasUnpaidFines" => Some(Value::Bool(args.first().and_then(Value::as_bool).unwrap_or(false))),
                _ => None,
            }
        }
    }

    #[test]
    fn evaluates_simple_comparison() {
        let g = Guard::parse("1 < 2").unwrap();
        let funcs = NoFunctions;
        assert!(g.evaluate(&Context::new(&funcs)));
    }

    #[test]
    fn evaluates_boolean_literal() {
        let g = Guard::parse("true").unwrap();
        let funcs = NoFunctions;
        assert!(g.evaluate(&Context::new(&funcs)));
        let g = Guard::parse("false").unwrap();
        assert!(!g.evaluate(&Context::new(&funcs)));
    }

    #[test]
    fn evaluates_function_call() {
        let g = Guard::parse("loanCount(self) > 0").unwrap();
        let funcs = TestFunctions;
        let mut ctx = Context::new(&funcs);
        ctx.bind_mut("self", Value::String("alice".into()));
        assert!(g.evaluate(&ctx));
    }

    #[test]
    fn resolves_dotted_field_access() {
        let mut props = std::collections::HashMap::new();
        props.insert("isOverdue".to_string(), Value::Bool(true));
        let artifact = Arc::new(ArtifactInstance::new("book-001", "Book", props));
        let g = Guard::parse("loan.isOverdue == true").unwrap();
        let funcs = NoFunctions;
        let mut ctx = Context::new(&funcs);
        ctx.bind_mut("loan", Value::Artifact(artifact));
        assert!(g.evaluate(&ctx));
    }

    #[test]
    fn unknown_identifier_is_failure_closed() {
        let g = Guard::parse("nonexistent == true").unwrap();
        let funcs = NoFunctions;
        assert!(!g.evaluate(&Context::new(&funcs)));
        assert!(g.try_evaluate(&Context::new(&funcs)).is_err());
    }

    #[test]
    fn combines_and_or_not() {
        let g = Guard::parse("not false and (true or false)").unwrap();
        let funcs = NoFunctions;
        assert!(g.evaluate(&Context::new(&funcs)));
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(Guard::parse("true true").is_err());
    }
}
