mod arith_var;
mod literal;

pub use arith_var::ArithVar;
pub use arith_var::TermId;
pub use arith_var::VarKind;
pub use arith_var::VarSort;
pub use literal::Literal;
