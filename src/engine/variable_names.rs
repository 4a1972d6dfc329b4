use crate::basic_types::HashMap;
use crate::engine::variables::ArithVar;

#[derive(Debug, Default)]
pub(crate) struct VariableNames {
    names: HashMap<ArithVar, String>,
    vars_by_name: HashMap<String, ArithVar>,
}

impl VariableNames {
    /// Get a variable by its name.
    pub(crate) fn get_var_by_name(&self, name: &str) -> Option<ArithVar> {
        self.vars_by_name.get(name).copied()
    }

    /// Get the name associated with a variable.
    pub(crate) fn get_name(&self, var: ArithVar) -> Option<&str> {
        self.names.get(&var).map(|s| s.as_str())
    }

    /// Add a name to the variable. This will override the existing name if it exists.
    pub(crate) fn add_name(&mut self, var: ArithVar, name: String) {
        if let Some(previous) = self.names.insert(var, name.clone()) {
            let _ = self.vars_by_name.remove(&previous);
        }
        let _ = self.vars_by_name.insert(name, var);
    }

    /// Forget the names of every variable from `num_vars` on.
    pub(crate) fn truncate(&mut self, num_vars: usize) {
        self.names.retain(|var, _| (var.id as usize) < num_vars);
        self.vars_by_name
            .retain(|_, var| (var.id as usize) < num_vars);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renaming_releases_the_old_name() {
        let mut names = VariableNames::default();
        names.add_name(ArithVar::new(0), "x".to_owned());
        names.add_name(ArithVar::new(0), "y".to_owned());

        assert_eq!(None, names.get_var_by_name("x"));
        assert_eq!(Some(ArithVar::new(0)), names.get_var_by_name("y"));
        assert_eq!(Some("y"), names.get_name(ArithVar::new(0)));
    }

    #[test]
    fn truncation_drops_names_of_removed_variables() {
        let mut names = VariableNames::default();
        names.add_name(ArithVar::new(0), "kept".to_owned());
        names.add_name(ArithVar::new(3), "dropped".to_owned());

        names.truncate(1);

        assert_eq!(Some(ArithVar::new(0)), names.get_var_by_name("kept"));
        assert_eq!(None, names.get_var_by_name("dropped"));
    }
}
