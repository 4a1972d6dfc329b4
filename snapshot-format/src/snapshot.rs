use num_rational::BigRational;

/// The sort of a declared variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sort {
    Int,
    Real,
}

impl Sort {
    pub fn smtlib_name(self) -> &'static str {
        match self {
            Sort::Int => "Int",
            Sort::Real => "Real",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub sort: Sort,
}

/// A single `(assert ...)` command of the snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Assertion {
    /// `(= base (+ (* c x) ...))`
    Row {
        base: String,
        terms: Vec<(BigRational, String)>,
    },
    /// `(= var (* x y ...))`, a factor may repeat to express a power.
    Product { var: String, factors: Vec<String> },
    /// `(= var k)`
    Fixed { var: String, value: BigRational },
    /// `(<= k var)` or `(< k var)` when strict.
    Lower {
        var: String,
        value: BigRational,
        strict: bool,
    },
    /// `(<= var k)` or `(< var k)` when strict.
    Upper {
        var: String,
        value: BigRational,
        strict: bool,
    },
}

/// An ordered list of declarations followed by an ordered list of assertions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub declarations: Vec<Declaration>,
    pub assertions: Vec<Assertion>,
}

impl Snapshot {
    pub fn declare(&mut self, name: impl Into<String>, sort: Sort) {
        self.declarations.push(Declaration {
            name: name.into(),
            sort,
        });
    }

    pub fn assert(&mut self, assertion: Assertion) {
        self.assertions.push(assertion);
    }

    pub fn sort_of(&self, name: &str) -> Option<Sort> {
        self.declarations
            .iter()
            .find(|declaration| declaration.name == name)
            .map(|declaration| declaration.sort)
    }
}
