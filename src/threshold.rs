use crate::model::{LinExpr, Model, Var};

/// Adds a fresh binary `l` to `model` with `l = 1` iff `a < c`.
///
/// `a` must be an integer expression with `0 <= a <= upper`, and `c` must lie in
/// `0..=upper + 1`. The two constraints are
///
/// ```text
/// a - c <= (1 - l) * (upper + 1) - 1      (l = 1 forces a <= c - 1)
/// -l * (upper + 1) <= a - c               (l = 0 forces a >= c)
/// ```
///
/// - a > c: l = 1 gives a - c <= -1, false. l = 0 gives 0 <= a - c <= upper, true.
/// - a = c: same as above, only l = 0 is feasible.
/// - a < c: l = 0 gives a - c >= 0, false. l = 1 gives -(upper + 1) <= a - c <= -1, true.
pub fn lt_const(model :&mut Model, name :&str, a :impl Into<LinExpr>, c :i64, upper :i64) -> Var {
    debug_assert!(c >= 0 && c <= upper + 1, "threshold {} outside 0..={}", c, upper + 1);
    let a = a.into();
    let l = model.binary(name);
    let big = upper + 1;
    model.leq(format!("{}_below", name), a.clone() - c, (LinExpr::from(1) - l) * big - 1);
    model.leq(format!("{}_above", name), l * -big, a - c);
    l
}
