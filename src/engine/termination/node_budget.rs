use super::TerminationCondition;

/// Stops once a fixed number of case-split nodes has been explored.
#[derive(Clone, Copy, Debug)]
pub struct NodeBudget {
    remaining: u64,
}

impl NodeBudget {
    pub fn new(nodes: u64) -> NodeBudget {
        NodeBudget { remaining: nodes }
    }
}

impl TerminationCondition for NodeBudget {
    fn should_stop(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_runs_out_after_the_given_number_of_nodes() {
        let mut budget = NodeBudget::new(2);
        assert!(!budget.should_stop());
        assert!(!budget.should_stop());
        assert!(budget.should_stop());
    }
}
