use crate::error::FillError;
use folio_template_core::CompiledTemplate;
use folio_types::ParameterMap;
use serde_json::{Map, Value};

/// Builds the `param` expression scope.
///
/// Every scalar parameter supplied is visible, declared or not. A declared
/// parameter that was not supplied takes its default, or null when it is
/// optional. Document parameters are not visible to expressions.
pub(crate) fn parameter_scope(
    template: &CompiledTemplate,
    params: &ParameterMap,
) -> Result<Map<String, Value>, FillError> {
    let mut scope = params.scalars();
    for declared in template.parameters() {
        if params.contains_key(&declared.name) {
            scope.entry(declared.name.clone()).or_insert(Value::Null);
            continue;
        }
        let value = match (&declared.default, declared.required) {
            (Some(default), _) => default.clone(),
            (None, true) => return Err(FillError::MissingParameter(declared.name.clone())),
            (None, false) => Value::Null,
        };
        scope.insert(declared.name.clone(), value);
    }
    Ok(scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_template_core::compile;
    use serde_json::json;

    fn template() -> CompiledTemplate {
        let source = json!({
            "name": "p",
            "parameters": [
                {"name": "title", "required": true},
                {"name": "region", "default": "north"},
                {"name": "note"}
            ]
        });
        compile(&serde_json::to_vec(&source).unwrap()).unwrap()
    }

    #[test]
    fn test_defaults_and_nulls() {
        let params = ParameterMap::new().with("title", "Q1").with("extra", 3i64);
        let scope = parameter_scope(&template(), &params).unwrap();
        assert_eq!(
            Value::Object(scope),
            json!({"title": "Q1", "region": "north", "note": null, "extra": 3})
        );
    }

    #[test]
    fn test_supplied_value_beats_default() {
        let params = ParameterMap::new().with("title", "Q1").with("region", "south");
        let scope = parameter_scope(&template(), &params).unwrap();
        assert_eq!(scope["region"], json!("south"));
    }

    #[test]
    fn test_missing_required_parameter() {
        let err = parameter_scope(&template(), &ParameterMap::new()).unwrap_err();
        assert!(matches!(err, FillError::MissingParameter(ref name) if name == "title"));
    }
}
