//! Formula fields: arithmetic over other fields' placeholders.
//!
//! Formula fields are evaluated in ascending `order`, and each result is visible to the
//! formulas after it. Missing, blank or non-numeric operands count as zero.

mod parser;

pub use parser::{parse, BinaryOp, Expr, FormulaError};

use crate::model::values::{resolve, ComputedValues, FormValues};
use crate::model::FieldDefinition;

/// Value reported for a formula that cannot be evaluated.
pub const ERROR_SENTINEL: &str = "ERROR";

/// Evaluates one formula against `values` and formats the result.
///
/// A blank formula yields an empty string.
pub fn evaluate(
    formula: &str,
    values: &FormValues,
    decimal_places: Option<u32>,
) -> Result<String, FormulaError> {
    if formula.trim().is_empty() {
        return Ok(String::new());
    }
    let expr = parse(formula)?;
    let result = expr.eval(&|name| numeric_value(values, name));
    if !result.is_finite() {
        return Err(FormulaError::NonFinite);
    }
    Ok(format_number(result, decimal_places))
}

/// Computes every formula field of the schema.
///
/// The returned map only holds formula placeholders; a formula that fails to parse or
/// overflows maps to [`ERROR_SENTINEL`].
pub fn evaluate_all(fields: &[FieldDefinition], values: &FormValues) -> ComputedValues {
    let mut formula_fields: Vec<&FieldDefinition> =
        fields.iter().filter(|field| field.is_calculated()).collect();
    formula_fields.sort_by_key(|field| field.order);

    let mut scope = values.clone();
    let mut computed = ComputedValues::new();
    for field in formula_fields {
        let formula = field.formula.as_deref().unwrap_or_default();
        let value = evaluate(formula, &scope, field.decimal_places)
            .unwrap_or_else(|_| ERROR_SENTINEL.to_string());
        scope.insert(field.placeholder.clone(), value.clone());
        computed.insert(field.placeholder.clone(), value);
    }
    computed
}

/// Names referenced by a formula, braces stripped. Unparseable formulas reference nothing.
pub fn references(formula: &str) -> Vec<String> {
    let Ok(expr) = parse(formula) else {
        return Vec::new();
    };
    let mut refs = Vec::new();
    expr.collect_refs(&mut refs);
    refs.into_iter()
        .map(|name| {
            name.strip_prefix("{{")
                .and_then(|rest| rest.strip_suffix("}}"))
                .unwrap_or(name)
                .to_string()
        })
        .collect()
}

fn numeric_value(values: &FormValues, name: &str) -> f64 {
    resolve(values, name)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Output formatting for formula results.
///
/// - no `decimal_places`: whole numbers without a fraction, everything else with two
///   decimals;
/// - `Some(0)`: rounded half up to an integer;
/// - `Some(n)`: exactly `n` decimals.
///
/// Fractions are rounded half away from zero on the shortest decimal form of the value, so
/// `0.125` becomes `0.13`.
pub fn format_number(value: f64, decimal_places: Option<u32>) -> String {
    // -0.0 would print as "-0"
    let value = if value == 0.0 { 0.0 } else { value };
    match decimal_places {
        None if value.fract() == 0.0 => format!("{:.0}", value),
        None => round_half_up(value, 2),
        Some(0) => format!("{:.0}", (value + 0.5).floor()),
        Some(places) => round_half_up(value, places as usize),
    }
}

fn round_half_up(value: f64, places: usize) -> String {
    // Display never uses exponent notation for f64
    let shortest = format!("{}", value.abs());
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));

    let mut digits: Vec<u8> = int_part.bytes().collect();
    digits.extend(frac_part.bytes().take(places));
    digits.resize(int_part.len() + places, b'0');

    if frac_part.as_bytes().get(places).is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - places;
    let mut out = String::with_capacity(digits.len() + 2);
    if value < 0.0 && digits.iter().any(|d| *d != b'0') {
        out.push('-');
    }
    out.extend(digits[..split].iter().map(|d| char::from(*d)));
    if places > 0 {
        out.push('.');
        out.extend(digits[split..].iter().map(|d| char::from(*d)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldType;

    fn formula_field(id: &str, placeholder: &str, formula: &str, order: i32) -> FieldDefinition {
        FieldDefinition {
            id: id.to_string(),
            display_name: id.to_string(),
            placeholder: placeholder.to_string(),
            field_type: FieldType::Formula,
            order,
            required: false,
            remember_values: false,
            formula: Some(formula.to_string()),
            decimal_places: None,
        }
    }

    fn values(pairs: &[(&str, &str)]) -> FormValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn bare_placeholder_with_two_decimals() {
        let mut doubled = formula_field("b", "B", "A*2", 2);
        doubled.decimal_places = Some(2);
        let computed = evaluate_all(&[doubled], &values(&[("A", "3")]));
        assert_eq!(computed.get("B").map(String::as_str), Some("6.00"));
    }

    #[test]
    fn braced_placeholders_resolve() {
        let total = formula_field("total", "{{TOTAL}}", "{{PRICE}} * {{QTY}}", 1);
        let computed = evaluate_all(
            &[total],
            &values(&[("{{PRICE}}", "12.5"), ("{{QTY}}", "4")]),
        );
        assert_eq!(computed.get("{{TOTAL}}").map(String::as_str), Some("50"));
    }

    #[test]
    fn later_formulas_see_earlier_results() {
        let net = formula_field("net", "{{NET}}", "{{GROSS}} - {{TARE}}", 1);
        let mut per_unit = formula_field("unit", "{{UNIT}}", "{{NET}} / {{PIECES}}", 2);
        per_unit.decimal_places = Some(3);
        // declared out of order on purpose
        let computed = evaluate_all(
            &[per_unit, net],
            &values(&[("{{GROSS}}", "1000"), ("{{TARE}}", "250"), ("{{PIECES}}", "7")]),
        );
        assert_eq!(computed.get("{{NET}}").map(String::as_str), Some("750"));
        assert_eq!(computed.get("{{UNIT}}").map(String::as_str), Some("107.143"));
    }

    #[test]
    fn missing_and_non_numeric_operands_count_as_zero() {
        let sum = formula_field("sum", "S", "A + B + C", 1);
        let computed = evaluate_all(&[sum], &values(&[("A", "2"), ("B", "abc"), ("C", " ")]));
        assert_eq!(computed.get("S").map(String::as_str), Some("2"));
    }

    #[test]
    fn broken_formula_maps_to_sentinel() {
        let broken = formula_field("bad", "BAD", "A + * 2", 1);
        let computed = evaluate_all(&[broken], &values(&[("A", "1")]));
        assert_eq!(computed.get("BAD").map(String::as_str), Some(ERROR_SENTINEL));
    }

    #[test]
    fn overflow_maps_to_sentinel() {
        assert_eq!(
            evaluate("A * A", &values(&[("A", "1e200")]), None),
            Err(FormulaError::NonFinite)
        );
    }

    #[test]
    fn plain_fields_are_not_computed() {
        let mut plain = formula_field("plain", "P", "1 + 1", 1);
        plain.field_type = FieldType::Number;
        assert!(evaluate_all(&[plain], &FormValues::new()).is_empty());
    }

    #[test]
    fn formatting_rules() {
        assert_eq!(format_number(6.0, None), "6");
        assert_eq!(format_number(2.0 / 3.0, None), "0.67");
        assert_eq!(format_number(2.5, Some(0)), "3");
        assert_eq!(format_number(-2.5, Some(0)), "-2");
        assert_eq!(format_number(1.0, Some(3)), "1.000");
        assert_eq!(format_number(-0.0, Some(2)), "0.00");
        assert_eq!(format_number(1e20, None), "100000000000000000000");
    }

    #[test]
    fn decimal_ties_round_up() {
        assert_eq!(format_number(0.125, Some(2)), "0.13");
        assert_eq!(format_number(0.25, Some(1)), "0.3");
        assert_eq!(format_number(0.125, None), "0.13");
        assert_eq!(format_number(1.005, Some(2)), "1.01");
        assert_eq!(format_number(9.995, Some(2)), "10.00");
        assert_eq!(format_number(-0.125, Some(2)), "-0.13");
        assert_eq!(format_number(-0.001, Some(2)), "0.00");
        assert_eq!(format_number(0.1 + 0.2, Some(2)), "0.30");
        assert_eq!(
            evaluate("A / 8", &values(&[("A", "1")]), Some(2)),
            Ok("0.13".to_string())
        );
    }

    #[test]
    fn references_strip_braces() {
        assert_eq!(
            references("({{GROSS}} - TARE) / 2"),
            vec!["GROSS".to_string(), "TARE".to_string()]
        );
        assert!(references("((").is_empty());
    }
}
