//! Backend-independent 0/1 integer program.
//!
//! The graph models only describe binary variables, sparse linear rows and a
//! linear objective to minimise; turning that into solver calls is the job of
//! an [`IlpBackend`](super::backend::IlpBackend).

/// Comparison used by a linear row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    /// `lhs <= rhs`
    LessOrEqual,
    /// `lhs == rhs`
    Equal,
    /// `lhs >= rhs`
    GreaterOrEqual,
}

/// A sparse linear constraint over binary variables
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    /// `(variable index, coefficient)` pairs
    pub terms: Vec<(usize, f64)>,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Evaluate the row on a 0/1 assignment
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        let lhs: f64 = self
            .terms
            .iter()
            .map(|&(i, c)| if values[i] { c } else { 0.0 })
            .sum();
        match self.sense {
            ConstraintSense::LessOrEqual => lhs <= self.rhs + 1e-9,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= 1e-9,
            ConstraintSense::GreaterOrEqual => lhs >= self.rhs - 1e-9,
        }
    }
}

/// Minimisation problem over binary variables
#[derive(Debug, Clone, Default)]
pub struct BinaryProgram {
    pub name: String,
    pub var_names: Vec<String>,
    /// Sparse objective, minimised
    pub objective: Vec<(usize, f64)>,
    pub constraints: Vec<LinearConstraint>,
}

impl BinaryProgram {
    pub fn new(name: &str) -> Self {
        BinaryProgram {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Add a binary variable and return its index
    pub fn add_var(&mut self, name: String) -> usize {
        self.var_names.push(name);
        self.var_names.len() - 1
    }

    pub fn num_vars(&self) -> usize {
        self.var_names.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn add_constraint(&mut self, terms: Vec<(usize, f64)>, sense: ConstraintSense, rhs: f64) {
        self.constraints.push(LinearConstraint { terms, sense, rhs });
    }

    /// `Σ vars >= rhs`
    pub fn add_sum_geq(&mut self, vars: &[usize], rhs: f64) {
        let terms = vars.iter().map(|&v| (v, 1.0)).collect();
        self.add_constraint(terms, ConstraintSense::GreaterOrEqual, rhs);
    }

    /// `Σ vars <= rhs`
    pub fn add_sum_leq(&mut self, vars: &[usize], rhs: f64) {
        let terms = vars.iter().map(|&v| (v, 1.0)).collect();
        self.add_constraint(terms, ConstraintSense::LessOrEqual, rhs);
    }

    /// `Σ vars == rhs`
    pub fn add_sum_eq(&mut self, vars: &[usize], rhs: f64) {
        let terms = vars.iter().map(|&v| (v, 1.0)).collect();
        self.add_constraint(terms, ConstraintSense::Equal, rhs);
    }

    /// `a <= b`
    pub fn add_implication(&mut self, a: usize, b: usize) {
        self.add_constraint(vec![(a, 1.0), (b, -1.0)], ConstraintSense::LessOrEqual, 0.0);
    }

    /// Fix a variable to 0 or 1
    pub fn fix(&mut self, var: usize, value: bool) {
        let rhs = if value { 1.0 } else { 0.0 };
        self.add_constraint(vec![(var, 1.0)], ConstraintSense::Equal, rhs);
    }

    /// Minimise `Σ vars`
    pub fn minimise_count(&mut self, vars: &[usize]) {
        self.objective = vars.iter().map(|&v| (v, 1.0)).collect();
    }

    /// Check every row on a 0/1 assignment
    pub fn is_satisfied_by(&self, values: &[bool]) -> bool {
        values.len() == self.num_vars() && self.constraints.iter().all(|c| c.is_satisfied(values))
    }

    /// Whether every objective coefficient is a whole number
    pub fn has_integral_objective(&self) -> bool {
        self.objective.iter().all(|&(_, c)| c.fract() == 0.0)
    }

    pub fn objective_value(&self, values: &[bool]) -> f64 {
        self.objective
            .iter()
            .map(|&(i, c)| if values[i] { c } else { 0.0 })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_evaluation() {
        let mut program = BinaryProgram::new("toy");
        let a = program.add_var("a".to_string());
        let b = program.add_var("b".to_string());
        program.add_sum_geq(&[a, b], 1.0);
        program.add_implication(a, b);
        program.minimise_count(&[a, b]);

        assert!(program.is_satisfied_by(&[false, true]));
        assert!(!program.is_satisfied_by(&[true, false]));
        assert!(!program.is_satisfied_by(&[false, false]));
        assert_eq!(program.objective_value(&[true, true]), 2.0);
        assert!(program.has_integral_objective());

        program.objective = vec![(a, 0.5)];
        assert!(!program.has_integral_objective());
    }
}
