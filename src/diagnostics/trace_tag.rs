use enumset::EnumSetType;

/// The diagnostic channels the engine can trace to. Each tag is toggled independently on a
/// [`crate::Diagnostics`] context.
#[derive(EnumSetType, Debug, Hash)]
pub enum TraceTag {
    /// Pivots, repair steps and row conflicts.
    Simplex,
    /// Installation of bounds and bound conflicts.
    Bounds,
    /// Atom assertions and literal propagations.
    Atoms,
    /// GCD tests, patches, cuts and branches.
    Integer,
    /// Interval propagation, cross-nested checks and the basis step.
    Nonlinear,
    /// Scope pushes and pops.
    Backtrack,
}

impl TraceTag {
    pub fn name(self) -> &'static str {
        match self {
            TraceTag::Simplex => "simplex",
            TraceTag::Bounds => "bounds",
            TraceTag::Atoms => "atoms",
            TraceTag::Integer => "integer",
            TraceTag::Nonlinear => "nonlinear",
            TraceTag::Backtrack => "backtrack",
        }
    }

    pub fn from_name(name: &str) -> Option<TraceTag> {
        enumset::EnumSet::<TraceTag>::all()
            .iter()
            .find(|tag| tag.name() == name)
    }
}
