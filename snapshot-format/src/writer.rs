use std::io::Write;

use thiserror::Error;

use crate::Assertion;
use crate::Numeral;
use crate::Snapshot;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write snapshot")]
    Io(#[from] std::io::Error),

    #[error("variable '{0}' is used before it is declared")]
    UndeclaredVariable(String),

    #[error("the product defining '{0}' has fewer than two factors")]
    DegenerateProduct(String),
}

/// Writes the snapshot as SMT-LIB commands, one per line, followed by `(check-sat)`.
pub fn write_snapshot(snapshot: &Snapshot, mut sink: impl Write) -> Result<(), WriteError> {
    for declaration in &snapshot.declarations {
        writeln!(
            sink,
            "(declare-fun {} () {})",
            declaration.name,
            declaration.sort.smtlib_name()
        )?;
    }

    for assertion in &snapshot.assertions {
        check_declared(snapshot, assertion)?;
        write!(sink, "(assert ")?;
        write_assertion(assertion, &mut sink)?;
        writeln!(sink, ")")?;
    }

    writeln!(sink, "(check-sat)")?;
    sink.flush()?;

    Ok(())
}

fn write_assertion(assertion: &Assertion, sink: &mut impl Write) -> Result<(), WriteError> {
    match assertion {
        Assertion::Row { base, terms } => {
            write!(sink, "(= {base} (+")?;
            if terms.is_empty() {
                write!(sink, " 0")?;
            }
            for (coefficient, var) in terms {
                write!(sink, " (* {} {var})", Numeral(coefficient))?;
            }
            write!(sink, "))")?;
        }
        Assertion::Product { var, factors } => {
            if factors.len() < 2 {
                return Err(WriteError::DegenerateProduct(var.clone()));
            }
            write!(sink, "(= {var} (*")?;
            for factor in factors {
                write!(sink, " {factor}")?;
            }
            write!(sink, "))")?;
        }
        Assertion::Fixed { var, value } => write!(sink, "(= {var} {})", Numeral(value))?,
        Assertion::Lower { var, value, strict } => {
            let relation = if *strict { "<" } else { "<=" };
            write!(sink, "({relation} {} {var})", Numeral(value))?;
        }
        Assertion::Upper { var, value, strict } => {
            let relation = if *strict { "<" } else { "<=" };
            write!(sink, "({relation} {var} {})", Numeral(value))?;
        }
    }

    Ok(())
}

fn check_declared(snapshot: &Snapshot, assertion: &Assertion) -> Result<(), WriteError> {
    let mut names: Vec<&str> = vec![];
    match assertion {
        Assertion::Row { base, terms } => {
            names.push(base);
            names.extend(terms.iter().map(|(_, var)| var.as_str()));
        }
        Assertion::Product { var, factors } => {
            names.push(var);
            names.extend(factors.iter().map(String::as_str));
        }
        Assertion::Fixed { var, .. }
        | Assertion::Lower { var, .. }
        | Assertion::Upper { var, .. } => names.push(var),
    }

    match names
        .into_iter()
        .find(|name| snapshot.sort_of(name).is_none())
    {
        Some(name) => Err(WriteError::UndeclaredVariable(name.to_owned())),
        None => Ok(()),
    }
}
