//! An explicit integer linear program.
//!
//! Encoders push variables and constraints into a [`Model`] they are handed by
//! `&mut`; nothing lives in a global solver context. A model is solver-agnostic
//! and can be checked against an [`Assignment`] without any backend, which is
//! what the encoding tests rely on.

use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};

/// Handle to a variable of one particular [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(usize);

impl Var {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Binary,
    Integer { min :i64, max :i64 },
}

impl Domain {
    pub fn bounds(&self) -> (i64, i64) {
        match *self {
            Domain::Binary => (0, 1),
            Domain::Integer { min, max } => (min, max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDef {
    pub name :String,
    pub domain :Domain,
}

/// `sum(coef * var) + constant` with integer coefficients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinExpr {
    terms :Vec<(Var, i64)>,
    constant :i64,
}

impl LinExpr {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(c :i64) -> Self {
        LinExpr { terms: Vec::new(), constant: c }
    }

    pub fn term(var :Var, coef :i64) -> Self {
        LinExpr { terms: vec![(var, coef)], constant: 0 }
    }

    pub fn add_term(&mut self, var :Var, coef :i64) {
        self.terms.push((var, coef));
    }

    pub fn terms(&self) -> &[(Var, i64)] {
        &self.terms
    }

    /// Merges repeated variables, drops zero coefficients, orders by variable.
    pub fn normalized(&self) -> LinExpr {
        let mut merged :BTreeMap<Var, i64> = BTreeMap::new();
        for (v, c) in self.terms.iter().copied() {
            *merged.entry(v).or_insert(0) += c;
        }
        LinExpr {
            terms: merged.into_iter().filter(|(_, c)| *c != 0).collect(),
            constant: self.constant,
        }
    }

    pub fn eval(&self, assignment :&Assignment) -> i64 {
        self.constant + self.terms.iter().map(|(v, c)| c * assignment.value(*v)).sum::<i64>()
    }
}

impl From<Var> for LinExpr {
    fn from(v :Var) -> Self {
        LinExpr::term(v, 1)
    }
}

impl From<i64> for LinExpr {
    fn from(c :i64) -> Self {
        LinExpr::constant(c)
    }
}

impl From<i32> for LinExpr {
    fn from(c :i32) -> Self {
        LinExpr::constant(c as i64)
    }
}

impl<T :Into<LinExpr>> Add<T> for LinExpr {
    type Output = LinExpr;
    fn add(mut self, rhs :T) -> LinExpr {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl<T :Into<LinExpr>> Sub<T> for LinExpr {
    type Output = LinExpr;
    fn sub(self, rhs :T) -> LinExpr {
        self + (-rhs.into())
    }
}

impl Neg for LinExpr {
    type Output = LinExpr;
    fn neg(self) -> LinExpr {
        self * -1
    }
}

impl Mul<i64> for LinExpr {
    type Output = LinExpr;
    fn mul(mut self, k :i64) -> LinExpr {
        for t in self.terms.iter_mut() {
            t.1 *= k;
        }
        self.constant *= k;
        self
    }
}

impl<T :Into<LinExpr>> Add<T> for Var {
    type Output = LinExpr;
    fn add(self, rhs :T) -> LinExpr {
        LinExpr::from(self) + rhs
    }
}

impl<T :Into<LinExpr>> Sub<T> for Var {
    type Output = LinExpr;
    fn sub(self, rhs :T) -> LinExpr {
        LinExpr::from(self) - rhs
    }
}

impl Mul<i64> for Var {
    type Output = LinExpr;
    fn mul(self, k :i64) -> LinExpr {
        LinExpr::term(self, k)
    }
}

impl Sum<LinExpr> for LinExpr {
    fn sum<I :Iterator<Item = LinExpr>>(iter :I) -> LinExpr {
        iter.fold(LinExpr::zero(), |acc, e| acc + e)
    }
}

impl Sum<Var> for LinExpr {
    fn sum<I :Iterator<Item = Var>>(iter :I) -> LinExpr {
        LinExpr { terms: iter.map(|v| (v, 1)).collect(), constant: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cmp {
    Le,
    Ge,
    Eq,
}

impl fmt::Display for Cmp {
    fn fmt(&self, f :&mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Cmp::Le => "<=",
            Cmp::Ge => ">=",
            Cmp::Eq => "=",
        })
    }
}

/// `lhs cmp rhs`, with every variable on the left and every constant on the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub name :String,
    pub lhs :LinExpr,
    pub cmp :Cmp,
    pub rhs :i64,
}

impl Constraint {
    pub fn holds(&self, assignment :&Assignment) -> bool {
        let lhs = self.lhs.eval(assignment);
        match self.cmp {
            Cmp::Le => lhs <= self.rhs,
            Cmp::Ge => lhs >= self.rhs,
            Cmp::Eq => lhs == self.rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    pub direction :Direction,
    pub expr :LinExpr,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    vars :Vec<VarDef>,
    constraints :Vec<Constraint>,
    objective :Option<Objective>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_var(&mut self, name :impl Into<String>, domain :Domain) -> Var {
        self.vars.push(VarDef { name: name.into(), domain });
        Var(self.vars.len() - 1)
    }

    pub fn binary(&mut self, name :impl Into<String>) -> Var {
        self.add_var(name, Domain::Binary)
    }

    pub fn integer(&mut self, name :impl Into<String>, min :i64, max :i64) -> Var {
        self.add_var(name, Domain::Integer { min, max })
    }

    /// Adds `lhs cmp rhs`. Constants on the left are moved to the right.
    pub fn constrain(&mut self, name :impl Into<String>, lhs :impl Into<LinExpr>, cmp :Cmp, rhs :impl Into<LinExpr>) {
        let diff = (lhs.into() - rhs.into()).normalized();
        let rhs = -diff.constant;
        let lhs = LinExpr { terms: diff.terms, constant: 0 };
        self.constraints.push(Constraint { name: name.into(), lhs, cmp, rhs });
    }

    pub fn leq(&mut self, name :impl Into<String>, lhs :impl Into<LinExpr>, rhs :impl Into<LinExpr>) {
        self.constrain(name, lhs, Cmp::Le, rhs)
    }

    pub fn geq(&mut self, name :impl Into<String>, lhs :impl Into<LinExpr>, rhs :impl Into<LinExpr>) {
        self.constrain(name, lhs, Cmp::Ge, rhs)
    }

    pub fn equal(&mut self, name :impl Into<String>, lhs :impl Into<LinExpr>, rhs :impl Into<LinExpr>) {
        self.constrain(name, lhs, Cmp::Eq, rhs)
    }

    pub fn set_objective(&mut self, direction :Direction, expr :impl Into<LinExpr>) {
        self.objective = Some(Objective { direction, expr: expr.into().normalized() });
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    pub fn all_vars(&self) -> impl Iterator<Item = Var> {
        (0..self.vars.len()).map(Var)
    }

    pub fn var(&self, v :Var) -> &VarDef {
        &self.vars[v.0]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Constraints violated by `assignment`, in emission order.
    pub fn violations<'a>(&'a self, assignment :&'a Assignment) -> impl Iterator<Item = &'a Constraint> + 'a {
        self.constraints.iter().filter(move |c| !c.holds(assignment))
    }

    /// Variables whose value lies outside their domain.
    pub fn out_of_domain<'a>(&'a self, assignment :&'a Assignment) -> impl Iterator<Item = &'a VarDef> + 'a {
        self.vars.iter().enumerate().filter(move |(idx, def)| {
            let (min, max) = def.domain.bounds();
            let value = assignment.value(Var(*idx));
            value < min || value > max
        }).map(|(_, def)| def)
    }

    /// True if `assignment` is a feasible point of this model.
    pub fn check(&self, assignment :&Assignment) -> bool {
        assignment.len() == self.vars.len()
            && self.out_of_domain(assignment).next().is_none()
            && self.violations(assignment).next().is_none()
    }
}

/// One integer value per model variable, indexed by [`Var`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    values :Vec<i64>,
}

impl Assignment {
    pub fn new(values :Vec<i64>) -> Self {
        Assignment { values }
    }

    /// All-zero assignment for `model`.
    pub fn zeros(model :&Model) -> Self {
        Assignment { values: vec![0; model.num_vars()] }
    }

    pub fn value(&self, v :Var) -> i64 {
        self.values.get(v.0).copied().unwrap_or(0)
    }

    pub fn is_one(&self, v :Var) -> bool {
        self.value(v) == 1
    }

    pub fn set(&mut self, v :Var, value :i64) {
        self.values[v.0] = value;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
