//! Constant transformation and folding.

use crate::base::{BitConstant, Operator};
use crate::ir::{Attrs, Factory, NodeId, NodeKind, Tree, f};
use crate::semantics::Semantics;
use crate::semantics::typing::{span_size, type_span};

fn int_of(tree: &Tree, cv: NodeId) -> Option<i64> {
    match tree.attrs(cv) {
        Attrs::IntValue { value } => Some(*value),
        Attrs::BoolValue { value } => Some(*value as i64),
        Attrs::BitValue { value } => match value {
            BitConstant::Zero | BitConstant::L => Some(0),
            BitConstant::One | BitConstant::H => Some(1),
            _ => None,
        },
        Attrs::CharValue { value } => Some(*value as i64),
        Attrs::RealValue { value } if value.fract() == 0.0 => Some(*value as i64),
        Attrs::BitvectorValue { value } => {
            if value.is_empty() || value.len() > 63 {
                return None;
            }
            i64::from_str_radix(value, 2).ok()
        }
        _ => None,
    }
}

fn real_of(tree: &Tree, cv: NodeId) -> Option<f64> {
    match tree.attrs(cv) {
        Attrs::RealValue { value } => Some(*value),
        _ => int_of(tree, cv).map(|v| v as f64),
    }
}

fn bits_of(value: i64, width: usize) -> Option<String> {
    if value < 0 {
        return None;
    }
    let bits = format!("{value:b}");
    if bits.len() > width {
        return None;
    }
    Some(format!("{}{}", "0".repeat(width - bits.len()), bits))
}

/// Re-express a constant in the shape demanded by `target`, attaching a
/// copy of `target` as its syntactic type. `None` when the value does
/// not fit the target type.
pub fn transform_constant(tree: &mut Tree, cv: NodeId, target: NodeId) -> Option<NodeId> {
    let target_kind = tree.kind(target);
    let mut fac = Factory::new(tree);
    let new = match target_kind {
        NodeKind::Int | NodeKind::Signed | NodeKind::Unsigned => {
            let v = int_of(fac.tree, cv)?;
            fac.intval(v)
        }
        NodeKind::Real => {
            let v = real_of(fac.tree, cv)?;
            fac.realval(v)
        }
        NodeKind::Bool => {
            let v = int_of(fac.tree, cv)?;
            if v != 0 && v != 1 {
                return None;
            }
            fac.boolval(v == 1)
        }
        NodeKind::Bit => match fac.tree.attrs(cv).clone() {
            Attrs::BitValue { value } => fac.bitval(value),
            _ => {
                let v = int_of(fac.tree, cv)?;
                if v != 0 && v != 1 {
                    return None;
                }
                fac.bitval(if v == 1 { BitConstant::One } else { BitConstant::Zero })
            }
        },
        NodeKind::Bitvector => {
            let width = type_span(fac.tree, target)
                .and_then(|s| span_size(fac.tree, s))
                .map(|s| s as usize);
            match fac.tree.attrs(cv).clone() {
                Attrs::BitvectorValue { value } => {
                    let resized = match width {
                        None => value,
                        Some(w) if value.len() == w => value,
                        Some(w) if value.len() < w => {
                            format!("{}{}", "0".repeat(w - value.len()), value)
                        }
                        Some(w) => {
                            let excess = value.len() - w;
                            if value[..excess].chars().all(|c| c == '0') {
                                value[excess..].to_string()
                            } else {
                                return None;
                            }
                        }
                    };
                    fac.bitvectorval(resized)
                }
                Attrs::BitValue { value } => {
                    if width.map_or(false, |w| w != 1) {
                        return None;
                    }
                    fac.bitvectorval(value.as_str())
                }
                _ => {
                    let v = int_of(fac.tree, cv)?;
                    let bits = bits_of(v, width.unwrap_or(64))?;
                    fac.bitvectorval(bits)
                }
            }
        }
        NodeKind::Char => {
            let v = int_of(fac.tree, cv)?;
            let c = u8::try_from(v).ok()? as char;
            fac.charval(c)
        }
        NodeKind::StringT => match fac.tree.attrs(cv).clone() {
            Attrs::StringValue { value } => fac.stringval(value),
            _ => return None,
        },
        _ => return None,
    };
    let ty = tree.copy(target);
    tree.set_slot(new, f::TYPE, Some(ty));
    Some(new)
}

/// Best-effort constant folding. Returns a replacement value (detached)
/// when the node folds to a constant; otherwise returns the node itself.
/// The input is treated as a scratch value owned by the caller.
pub fn simplify(tree: &mut Tree, value: NodeId, sem: &dyn Semantics) -> NodeId {
    match tree.kind(value) {
        NodeKind::Expression => simplify_expression(tree, value, sem),
        NodeKind::Cast => {
            let inner = match tree.slot(value, f::VALUE) {
                Some(v) => v,
                None => return value,
            };
            let folded = simplify(tree, inner, sem);
            if !tree.kind(folded).is_const_value() {
                if folded != inner {
                    tree.set_slot(value, f::VALUE, Some(folded));
                }
                return value;
            }
            let Some(ty) = tree.slot(value, f::TYPE) else { return value };
            match transform_constant(tree, folded, ty) {
                Some(cv) => cv,
                None => {
                    if folded != inner {
                        tree.set_slot(value, f::VALUE, Some(folded));
                    }
                    value
                }
            }
        }
        _ => value,
    }
}

fn simplify_expression(tree: &mut Tree, value: NodeId, sem: &dyn Semantics) -> NodeId {
    let op = tree.operator(value);
    let v1 = match tree.slot(value, f::VALUE1) {
        Some(v) => simplify(tree, v, sem),
        None => return value,
    };
    let v2 = tree.slot(value, f::VALUE2).map(|v| simplify(tree, v, sem));
    // Reattach folded operands so an unfoldable expression stays intact.
    if Some(v1) != tree.slot(value, f::VALUE1) {
        tree.set_slot(value, f::VALUE1, Some(v1));
    }
    if v2.is_some() && v2 != tree.slot(value, f::VALUE2) {
        tree.set_slot(value, f::VALUE2, v2);
    }

    let mut fac = Factory::new(tree);
    match (int_of(fac.tree, v1), v2.and_then(|v| int_of(fac.tree, v))) {
        (Some(a), Some(b)) => {
            let folded = match op {
                Operator::Plus => Some(a.wrapping_add(b)),
                Operator::Minus => Some(a.wrapping_sub(b)),
                Operator::Mult => Some(a.wrapping_mul(b)),
                Operator::Div if b != 0 => Some(a / b),
                Operator::Mod if b != 0 => Some(a.rem_euclid(b)),
                Operator::Rem if b != 0 => Some(a % b),
                Operator::Pow if (0..63).contains(&b) => a.checked_pow(b as u32),
                _ => None,
            };
            if let Some(n) = folded {
                return fac.intval(n);
            }
            let relation = match op {
                Operator::Eq | Operator::CaseEq => Some(a == b),
                Operator::Neq | Operator::CaseNeq => Some(a != b),
                Operator::Le => Some(a <= b),
                Operator::Ge => Some(a >= b),
                Operator::Lt => Some(a < b),
                Operator::Gt => Some(a > b),
                _ => None,
            };
            if let Some(flag) = relation {
                return fac.boolval(flag);
            }
            value
        }
        (Some(a), None) if v2.is_none() => match op {
            Operator::Minus => fac.intval(-a),
            Operator::Plus => fac.intval(a),
            Operator::Abs => fac.intval(a.abs()),
            _ => value,
        },
        _ => value,
    }
}

/// Fold a value and read it as a boolean, when possible.
pub fn simplify_to_bool(tree: &mut Tree, value: NodeId, sem: &dyn Semantics) -> Option<bool> {
    let folded = simplify(tree, value, sem);
    match tree.attrs(folded) {
        Attrs::BoolValue { value } => Some(*value),
        Attrs::BitValue { value } => Some(value.is_high()),
        Attrs::IntValue { value } => Some(*value != 0),
        _ => None,
    }
}

/// Fold a value and read it as an integer, when possible.
pub fn simplify_to_int(tree: &mut Tree, value: NodeId, sem: &dyn Semantics) -> Option<i64> {
    let folded = simplify(tree, value, sem);
    int_of(tree, folded)
}

/// Read a constant as an integer without folding. Bit-vector values
/// fold per their binary reading.
pub fn constant_as_int(tree: &Tree, cv: NodeId) -> Option<i64> {
    int_of(tree, cv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::HifSemantics;

    #[test]
    fn int_literals_become_bit_strings() {
        let mut tree = Tree::new();
        let mut fac = Factory::new(&mut tree);
        let five = fac.intval(5);
        let span = fac.range_downto(3, 0);
        let bv = fac.bitvector_type(span, false, false);
        let cv = transform_constant(&mut tree, five, bv).unwrap();
        assert_eq!(tree.attrs(cv), &Attrs::BitvectorValue { value: "0101".into() });
        assert!(tree.slot(cv, f::TYPE).is_some());
    }

    #[test]
    fn oversized_values_do_not_fit() {
        let mut tree = Tree::new();
        let mut fac = Factory::new(&mut tree);
        let big = fac.intval(42);
        let span = fac.range_downto(3, 0);
        let bv = fac.bitvector_type(span, false, false);
        assert!(transform_constant(&mut tree, big, bv).is_none());
    }

    #[test]
    fn folding_handles_nested_arithmetic() {
        let sem = HifSemantics::new();
        let mut tree = Tree::new();
        let mut fac = Factory::new(&mut tree);
        let a = fac.intval(6);
        let b = fac.intval(7);
        let mul = fac.expression(a, Operator::Mult, b);
        let one = fac.intval(1);
        let sum = fac.expression(mul, Operator::Plus, one);
        let folded = simplify(&mut tree, sum, &sem);
        assert_eq!(tree.attrs(folded), &Attrs::IntValue { value: 43 });
    }

    #[test]
    fn relations_fold_to_booleans() {
        let sem = HifSemantics::new();
        let mut tree = Tree::new();
        let mut fac = Factory::new(&mut tree);
        let a = fac.intval(3);
        let b = fac.intval(4);
        let le = fac.expression(a, Operator::Le, b);
        assert_eq!(simplify_to_bool(&mut tree, le, &sem), Some(true));
    }
}
