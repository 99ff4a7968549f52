//! Report variables: running aggregates over bound field values.

use crate::error::FillError;
use folio_template_core::{Calculation, ResetScope, VariableDesign};
use serde_json::{Map, Value};

pub const PAGE_NUMBER: &str = "PAGE_NUMBER";
pub const REPORT_COUNT: &str = "REPORT_COUNT";
/// Rows printed on the current page.
pub const PAGE_COUNT: &str = "PAGE_COUNT";

#[derive(Debug, Clone)]
struct Accumulator {
    calculation: Calculation,
    count: u64,
    // Exact sum while every input is an integer.
    int_sum: Option<i64>,
    float_sum: f64,
    extreme: Option<(f64, Value)>,
}

impl Accumulator {
    fn new(calculation: Calculation) -> Self {
        Self {
            calculation,
            count: 0,
            int_sum: Some(0),
            float_sum: 0.0,
            extreme: None,
        }
    }

    fn add(&mut self, name: &str, value: Option<&Value>) -> Result<(), FillError> {
        let Some(value) = value else {
            // Field-less count: one per row.
            self.count += 1;
            return Ok(());
        };
        if value.is_null() {
            return Ok(());
        }
        self.count += 1;
        if self.calculation == Calculation::Count {
            return Ok(());
        }

        let number = as_number(value).ok_or_else(|| FillError::NonNumeric {
            variable: name.to_string(),
            value: value.to_string(),
        })?;
        self.float_sum += number;
        self.int_sum = match (self.int_sum, as_integer(value)) {
            (Some(sum), Some(n)) => sum.checked_add(n),
            _ => None,
        };
        let replace = match (&self.extreme, self.calculation) {
            (None, _) => true,
            (Some((best, _)), Calculation::Lowest) => number < *best,
            (Some((best, _)), Calculation::Highest) => number > *best,
            _ => false,
        };
        if replace {
            self.extreme = Some((number, value.clone()));
        }
        Ok(())
    }

    fn value(&self) -> Value {
        match self.calculation {
            Calculation::Count => Value::from(self.count),
            Calculation::Sum => match self.int_sum {
                Some(sum) => Value::from(sum),
                None => Value::from(self.float_sum),
            },
            Calculation::Average if self.count == 0 => Value::Null,
            Calculation::Average => Value::from(self.float_sum / self.count as f64),
            Calculation::Lowest | Calculation::Highest => self
                .extreme
                .as_ref()
                .map_or(Value::Null, |(_, v)| v.clone()),
        }
    }
}

/// Numbers and numeric strings (as produced by XML rows) aggregate.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone)]
struct Variable {
    name: String,
    field: Option<String>,
    reset: ResetScope,
    accumulator: Accumulator,
}

/// The state of every declared variable during a fill.
#[derive(Debug, Clone)]
pub(crate) struct Variables {
    variables: Vec<Variable>,
}

impl Variables {
    pub(crate) fn new(designs: &[VariableDesign]) -> Self {
        let variables = designs
            .iter()
            .map(|d| Variable {
                name: d.name.clone(),
                field: d.field.clone(),
                reset: d.reset,
                accumulator: Accumulator::new(d.calculation),
            })
            .collect();
        Self { variables }
    }

    /// Folds one row's fields into every variable.
    pub(crate) fn update(&mut self, fields: &Map<String, Value>) -> Result<(), FillError> {
        for variable in &mut self.variables {
            let value = match &variable.field {
                Some(field) => Some(fields.get(field).unwrap_or(&Value::Null)),
                None => None,
            };
            variable.accumulator.add(&variable.name, value)?;
        }
        Ok(())
    }

    pub(crate) fn reset_page(&mut self) {
        for variable in &mut self.variables {
            if variable.reset == ResetScope::Page {
                variable.accumulator = Accumulator::new(variable.accumulator.calculation);
            }
        }
    }

    pub(crate) fn values(&self) -> Map<String, Value> {
        self.variables
            .iter()
            .map(|v| (v.name.clone(), v.accumulator.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn variable(name: &str, calculation: Calculation, field: Option<&str>, reset: ResetScope) -> VariableDesign {
        VariableDesign {
            name: name.to_string(),
            calculation,
            field: field.map(str::to_string),
            reset,
        }
    }

    fn row(amount: Value) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("amount".to_string(), amount);
        map
    }

    #[test]
    fn test_aggregates() {
        let mut vars = Variables::new(&[
            variable("n", Calculation::Count, None, ResetScope::Report),
            variable("total", Calculation::Sum, Some("amount"), ResetScope::Report),
            variable("mean", Calculation::Average, Some("amount"), ResetScope::Report),
            variable("low", Calculation::Lowest, Some("amount"), ResetScope::Report),
            variable("high", Calculation::Highest, Some("amount"), ResetScope::Report),
        ]);
        for amount in [10, 20, 30] {
            vars.update(&row(json!(amount))).unwrap();
        }
        let values = vars.values();
        assert_eq!(values["n"], json!(3));
        assert_eq!(values["total"], json!(60));
        assert_eq!(values["mean"], json!(20.0));
        assert_eq!(values["low"], json!(10));
        assert_eq!(values["high"], json!(30));
    }

    #[test]
    fn test_sum_switches_to_float() {
        let mut vars = Variables::new(&[variable("total", Calculation::Sum, Some("amount"), ResetScope::Report)]);
        vars.update(&row(json!(1))).unwrap();
        vars.update(&row(json!(0.5))).unwrap();
        assert_eq!(vars.values()["total"], json!(1.5));
    }

    #[test]
    fn test_nulls_are_skipped_and_strings_parse() {
        let mut vars = Variables::new(&[
            variable("count", Calculation::Count, Some("amount"), ResetScope::Report),
            variable("total", Calculation::Sum, Some("amount"), ResetScope::Report),
        ]);
        vars.update(&row(Value::Null)).unwrap();
        vars.update(&row(json!("2"))).unwrap();
        let values = vars.values();
        assert_eq!(values["count"], json!(1));
        assert_eq!(values["total"], json!(2));
        vars.update(&row(json!("0.5"))).unwrap();
        assert_eq!(vars.values()["total"], json!(2.5));
    }

    #[test]
    fn test_non_numeric_sum_fails() {
        let mut vars = Variables::new(&[variable("total", Calculation::Sum, Some("amount"), ResetScope::Report)]);
        let err = vars.update(&row(json!("ten"))).unwrap_err();
        assert!(matches!(err, FillError::NonNumeric { ref variable, .. } if variable == "total"));
    }

    #[test]
    fn test_page_reset_only_touches_page_variables() {
        let mut vars = Variables::new(&[
            variable("page_total", Calculation::Sum, Some("amount"), ResetScope::Page),
            variable("total", Calculation::Sum, Some("amount"), ResetScope::Report),
        ]);
        vars.update(&row(json!(5))).unwrap();
        vars.reset_page();
        vars.update(&row(json!(7))).unwrap();
        let values = vars.values();
        assert_eq!(values["page_total"], json!(7));
        assert_eq!(values["total"], json!(12));
    }

    #[test]
    fn test_empty_aggregates() {
        let vars = Variables::new(&[
            variable("total", Calculation::Sum, Some("amount"), ResetScope::Report),
            variable("mean", Calculation::Average, Some("amount"), ResetScope::Report),
        ]);
        let values = vars.values();
        assert_eq!(values["total"], json!(0));
        assert_eq!(values["mean"], Value::Null);
    }
}
