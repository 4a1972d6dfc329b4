use std::fmt::Display;
use std::fmt::Formatter;

use nom::branch::alt;
use nom::bytes::complete::is_not;
use nom::bytes::complete::take_while1;
use nom::character::complete::char as pchar;
use nom::character::complete::multispace1;
use nom::combinator::all_consuming;
use nom::combinator::map;
use nom::combinator::opt;
use nom::combinator::value;
use nom::multi::many0;
use nom::sequence::delimited;
use nom::sequence::pair;
use nom::sequence::preceded;
use nom::sequence::terminated;
use nom::IResult;
use num_bigint::BigInt;
use num_rational::BigRational;
use thiserror::Error;

use crate::numeral::ratio;
use crate::Assertion;
use crate::Snapshot;
use crate::Sort;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadError {
    #[error("syntax error near '{0}'")]
    Syntax(String),

    #[error("unsupported command '{0}'")]
    UnsupportedCommand(String),

    #[error("malformed assertion '{0}'")]
    MalformedAssertion(String),

    #[error("invalid numeral '{0}'")]
    InvalidNumeral(String),

    #[error("unknown sort '{0}'")]
    UnknownSort(String),

    #[error("variable '{0}' is used before it is declared")]
    UndeclaredVariable(String),
}

/// A parsed s-expression.
#[derive(Clone, Debug, PartialEq, Eq)]
enum SExpr {
    Symbol(String),
    List(Vec<SExpr>),
}

impl SExpr {
    fn symbol(&self) -> Option<&str> {
        match self {
            SExpr::Symbol(symbol) => Some(symbol),
            SExpr::List(_) => None,
        }
    }
}

impl Display for SExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SExpr::Symbol(symbol) => write!(f, "{symbol}"),
            SExpr::List(items) => {
                write!(f, "(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Parses a snapshot in the format produced by [`crate::write_snapshot`].
pub fn read_snapshot(source: &str) -> Result<Snapshot, ReadError> {
    let (_, commands) = all_consuming(terminated(many0(sexpr), whitespace))(source)
        .map_err(|error| ReadError::Syntax(syntax_context(error)))?;

    let mut snapshot = Snapshot::default();
    for command in commands {
        read_command(&mut snapshot, command)?;
    }

    Ok(snapshot)
}

fn syntax_context(error: nom::Err<nom::error::Error<&str>>) -> String {
    match error {
        nom::Err::Error(inner) | nom::Err::Failure(inner) => {
            inner.input.chars().take(32).collect()
        }
        nom::Err::Incomplete(_) => String::new(),
    }
}

fn whitespace(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), pair(pchar(';'), opt(is_not("\n")))),
        ))),
    )(input)
}

fn symbol(input: &str) -> IResult<&str, SExpr> {
    map(
        take_while1(|c: char| !c.is_whitespace() && c != '(' && c != ')' && c != ';'),
        |symbol: &str| SExpr::Symbol(symbol.to_owned()),
    )(input)
}

fn list(input: &str) -> IResult<&str, SExpr> {
    map(
        delimited(pchar('('), many0(sexpr), preceded(whitespace, pchar(')'))),
        SExpr::List,
    )(input)
}

fn sexpr(input: &str) -> IResult<&str, SExpr> {
    preceded(whitespace, alt((list, symbol)))(input)
}

fn read_command(snapshot: &mut Snapshot, command: SExpr) -> Result<(), ReadError> {
    let SExpr::List(items) = &command else {
        return Err(ReadError::UnsupportedCommand(command.to_string()));
    };

    match items.first().and_then(SExpr::symbol) {
        Some("declare-fun") => match items.as_slice() {
            [_, SExpr::Symbol(name), SExpr::List(arguments), SExpr::Symbol(sort)]
                if arguments.is_empty() =>
            {
                snapshot.declare(name.clone(), read_sort(sort)?);
                Ok(())
            }
            _ => Err(ReadError::UnsupportedCommand(command.to_string())),
        },
        Some("declare-const") => match items.as_slice() {
            [_, SExpr::Symbol(name), SExpr::Symbol(sort)] => {
                snapshot.declare(name.clone(), read_sort(sort)?);
                Ok(())
            }
            _ => Err(ReadError::UnsupportedCommand(command.to_string())),
        },
        Some("assert") => match items.as_slice() {
            [_, body] => {
                let assertion = read_assertion(body)?;
                require_declared(snapshot, &assertion)?;
                snapshot.assert(assertion);
                Ok(())
            }
            _ => Err(ReadError::MalformedAssertion(command.to_string())),
        },
        Some("check-sat") | Some("set-logic") | Some("set-info") | Some("exit") => Ok(()),
        _ => Err(ReadError::UnsupportedCommand(command.to_string())),
    }
}

fn read_sort(sort: &str) -> Result<Sort, ReadError> {
    match sort {
        "Int" => Ok(Sort::Int),
        "Real" => Ok(Sort::Real),
        other => Err(ReadError::UnknownSort(other.to_owned())),
    }
}

fn read_assertion(body: &SExpr) -> Result<Assertion, ReadError> {
    let malformed = || ReadError::MalformedAssertion(body.to_string());

    let SExpr::List(items) = body else {
        return Err(malformed());
    };
    let [SExpr::Symbol(relation), left, right] = items.as_slice() else {
        return Err(malformed());
    };

    match relation.as_str() {
        "=" => {
            let var = left.symbol().ok_or_else(malformed)?.to_owned();
            read_definition(var, right).ok_or_else(malformed)?
        }
        "<=" | "<" => {
            let strict = relation == "<";
            match (left, right) {
                (SExpr::Symbol(var), numeral) if !is_numeral_symbol(var) => Ok(Assertion::Upper {
                    var: var.clone(),
                    value: read_numeral(numeral)?,
                    strict,
                }),
                (numeral, SExpr::Symbol(var)) => Ok(Assertion::Lower {
                    var: var.clone(),
                    value: read_numeral(numeral)?,
                    strict,
                }),
                _ => Err(malformed()),
            }
        }
        _ => Err(malformed()),
    }
}

/// Reads the right hand side of `(= var ...)`. Returns `None` when the shape is not recognised.
fn read_definition(var: String, definition: &SExpr) -> Option<Result<Assertion, ReadError>> {
    let SExpr::List(items) = definition else {
        return Some(read_numeral(definition).map(|value| Assertion::Fixed { var, value }));
    };

    match items.first().and_then(SExpr::symbol) {
        Some("+") => {
            let mut terms = vec![];
            for item in &items[1..] {
                match item {
                    SExpr::List(product) => match product.as_slice() {
                        [SExpr::Symbol(times), coefficient, SExpr::Symbol(name)] if times == "*" => {
                            match read_numeral(coefficient) {
                                Ok(coefficient) => terms.push((coefficient, name.clone())),
                                Err(error) => return Some(Err(error)),
                            }
                        }
                        _ => return None,
                    },
                    SExpr::Symbol(zero) if zero == "0" => {}
                    SExpr::Symbol(_) => return None,
                }
            }
            Some(Ok(Assertion::Row { base: var, terms }))
        }
        Some("*") => {
            let factors = items[1..]
                .iter()
                .map(|factor| factor.symbol().map(str::to_owned))
                .collect::<Option<Vec<_>>>()?;
            if factors.len() < 2 {
                return None;
            }
            Some(Ok(Assertion::Product { var, factors }))
        }
        _ => Some(read_numeral(definition).map(|value| Assertion::Fixed { var, value })),
    }
}

fn is_numeral_symbol(symbol: &str) -> bool {
    symbol.chars().all(|c| c.is_ascii_digit())
}

fn read_numeral(expression: &SExpr) -> Result<BigRational, ReadError> {
    let invalid = || ReadError::InvalidNumeral(expression.to_string());

    match expression {
        SExpr::Symbol(digits) if is_numeral_symbol(digits) => digits
            .parse::<BigInt>()
            .map(BigRational::from_integer)
            .map_err(|_| invalid()),
        SExpr::Symbol(_) => Err(invalid()),
        SExpr::List(items) => match items.as_slice() {
            [SExpr::Symbol(minus), inner] if minus == "-" => Ok(-read_numeral(inner)?),
            [SExpr::Symbol(slash), numerator, denominator] if slash == "/" => {
                let numerator = read_numeral(numerator)?;
                let denominator = read_numeral(denominator)?;
                if !numerator.is_integer() || !denominator.is_integer() {
                    return Err(invalid());
                }
                ratio(numerator.to_integer(), denominator.to_integer()).ok_or_else(invalid)
            }
            _ => Err(invalid()),
        },
    }
}

fn require_declared(snapshot: &Snapshot, assertion: &Assertion) -> Result<(), ReadError> {
    let check = |name: &String| {
        snapshot
            .sort_of(name)
            .map(|_| ())
            .ok_or_else(|| ReadError::UndeclaredVariable(name.clone()))
    };

    match assertion {
        Assertion::Row { base, terms } => {
            check(base)?;
            terms.iter().try_for_each(|(_, var)| check(var))
        }
        Assertion::Product { var, factors } => {
            check(var)?;
            factors.iter().try_for_each(check)
        }
        Assertion::Fixed { var, .. }
        | Assertion::Lower { var, .. }
        | Assertion::Upper { var, .. } => check(var),
    }
}
