//! Tool declarations and argument validation.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value, json};

use super::error::ToolError;

/// The tools this server knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    Calculator,
    Timetable,
    AccountBook,
}

impl ToolName {
    /// Every tool, in listing order.
    pub const ALL: [ToolName; 3] = [ToolName::Calculator, ToolName::Timetable, ToolName::AccountBook];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Calculator => "calculator",
            ToolName::Timetable => "taiwan_high_speed_rail_timetable",
            ToolName::AccountBook => "account_book",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

/// Argument types a tool can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
}

impl ParamKind {
    fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
        }
    }
}

/// One declared argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
}

impl ParamSpec {
    pub fn string(name: &'static str, description: impl Into<String>) -> Self {
        Self {
            name,
            kind: ParamKind::String,
            description: description.into(),
            required: true,
        }
    }

    pub fn integer(name: &'static str, description: impl Into<String>) -> Self {
        Self {
            name,
            kind: ParamKind::Integer,
            description: description.into(),
            required: true,
        }
    }

    /// Append the accepted values to the description.
    pub fn allowed<S: AsRef<str>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        let listed: Vec<String> = values
            .into_iter()
            .map(|v| format!("\"{}\"", v.as_ref()))
            .collect();
        self.description
            .push_str(&format!(" Allowed values: {}.", listed.join(", ")));
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// A tool as advertised to the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: ToolName,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new(name: ToolName, description: impl Into<String>) -> Self {
        Self {
            name,
            description: description.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// JSON Schema of the arguments object.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| {
                (
                    p.name.to_string(),
                    json!({ "type": p.kind.as_str(), "description": p.description }),
                )
            })
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// `{name, description, inputSchema}`, as tool listings carry it.
    pub fn declaration(&self) -> Value {
        json!({
            "name": self.name.as_str(),
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }

    /// Check arguments against the declared parameters.
    ///
    /// Every declared argument that is present must have its declared
    /// type, and every required one must be present. Undeclared arguments
    /// are dropped.
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<ToolArgs, ToolError> {
        let mut values = Map::new();
        for param in &self.params {
            match arguments.get(param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(ToolError::MissingArgument(param.name.to_string()));
                }
                None | Some(Value::Null) => {}
                Some(value) => {
                    values.insert(param.name.to_string(), coerce(param, value)?);
                }
            }
        }
        Ok(ToolArgs { values })
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Accept a value of the declared kind; whole floats count as integers.
fn coerce(param: &ParamSpec, value: &Value) -> Result<Value, ToolError> {
    let accepted = match (param.kind, value) {
        (ParamKind::String, Value::String(_)) => Some(value.clone()),
        (ParamKind::Integer, Value::Number(n)) => n.as_i64().map(Value::from).or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| Value::from(f as i64))
        }),
        _ => None,
    };

    accepted.ok_or_else(|| ToolError::InvalidArgument {
        field: param.name.to_string(),
        expected: param.kind.as_str(),
        found: match value {
            Value::Number(n) => format!("number {n}"),
            other => type_name(other).to_string(),
        },
    })
}

/// Arguments that passed validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    values: Map<String, Value>,
}

impl ToolArgs {
    /// A string argument, or `""` when an optional one is absent.
    pub fn str(&self, name: &str) -> &str {
        self.values.get(name).and_then(Value::as_str).unwrap_or_default()
    }

    /// An integer argument, or `0` when an optional one is absent.
    pub fn int(&self, name: &str) -> i64 {
        self.values.get(name).and_then(Value::as_i64).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ToolSpec {
        ToolSpec::new(ToolName::AccountBook, "Ledger.")
            .param(ParamSpec::string("method", "Operation.").allowed(["create", "read"]))
            .param(ParamSpec::integer("itemId", "Row id."))
            .param(ParamSpec::string("itemName", "Name.").optional())
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn tool_names_parse() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>().unwrap(), tool);
        }
        assert_eq!(
            "weather".parse::<ToolName>().unwrap_err(),
            ToolError::UnknownTool("weather".into())
        );
    }

    #[test]
    fn schema_lists_params_and_required() {
        let schema = spec().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["itemId"]["type"], "integer");
        assert_eq!(schema["required"], json!(["method", "itemId"]));
        let method = schema["properties"]["method"]["description"].as_str().unwrap();
        assert!(method.ends_with("Allowed values: \"create\", \"read\"."));
    }

    #[test]
    fn valid_arguments_pass() {
        let parsed = spec()
            .validate(&args(json!({"method": "read", "itemId": 4, "extra": true})))
            .unwrap();
        assert_eq!(parsed.str("method"), "read");
        assert_eq!(parsed.int("itemId"), 4);
        assert_eq!(parsed.str("itemName"), "");
        assert_eq!(parsed.str("extra"), "");
    }

    #[test]
    fn whole_floats_are_integers() {
        let parsed = spec()
            .validate(&args(json!({"method": "read", "itemId": 4.0})))
            .unwrap();
        assert_eq!(parsed.int("itemId"), 4);
    }

    #[test]
    fn missing_required_argument() {
        let err = spec().validate(&args(json!({"method": "read"}))).unwrap_err();
        assert_eq!(err, ToolError::MissingArgument("itemId".into()));

        let err = spec()
            .validate(&args(json!({"method": null, "itemId": 2})))
            .unwrap_err();
        assert_eq!(err, ToolError::MissingArgument("method".into()));
    }

    #[test]
    fn wrong_types_name_the_field() {
        let err = spec()
            .validate(&args(json!({"method": "read", "itemId": "4"})))
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArgument {
                field: "itemId".into(),
                expected: "integer",
                found: "string".into()
            }
        );

        let err = spec()
            .validate(&args(json!({"method": "read", "itemId": 2.5})))
            .unwrap_err();
        assert!(err.to_string().contains("number 2.5"));

        let err = spec()
            .validate(&args(json!({"method": 3, "itemId": 2})))
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid argument `method`"));
    }
}
