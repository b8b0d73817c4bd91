//! Service definitions and their tagged argument form.
//!
//! In the configuration tree a definition is `[ctor-spec, arg, ...]` (or a
//! bare ctor-spec string). Argument strings carry their meaning in their
//! shape: exactly `%path%` is a raw parameter reference, text containing
//! `%path%` interpolates, a leading `@` is a service reference, anything
//! else is literal. That classification happens once, when the definition
//! is parsed, and the result is kept as a tagged [`Argument`] so each build
//! resolves without re-inspecting strings.

use serde_json::Value;

use crate::error::{DiError, Result};
use crate::placeholder;

/// How a definition constructs its instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorSpec {
    /// A registered constructor name.
    Class(String),
    /// `@service:method`: delegate to another service's factory capability.
    Factory {
        /// Id of the factory service.
        service: String,
        /// Method to invoke on it.
        method: String,
    },
}

impl ConstructorSpec {
    /// Reads a spec string. `@id:method` is a factory delegation; anything
    /// else, `@`-prefixed or not, is treated as a constructor name and
    /// fails at build time if nobody registered it.
    pub fn parse(spec: &str) -> ConstructorSpec {
        if let Some(rest) = spec.strip_prefix('@') {
            if let Some((service, method)) = rest.split_once(':') {
                return ConstructorSpec::Factory {
                    service: service.to_string(),
                    method: method.to_string(),
                };
            }
        }
        ConstructorSpec::Class(spec.to_string())
    }
}

/// One positional argument of a definition, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Passed through untouched, whatever it contains.
    Literal(Value),
    /// Exactly `%path%`: the raw parameter, original type preserved.
    ParameterRef(String),
    /// Text with embedded `%path%` placeholders, interpolated to a string.
    Interpolate(String),
    /// `@id`: resolved through the service lookup.
    ServiceRef(String),
    /// A list resolved element by element.
    List(Vec<Argument>),
    /// A mapping resolved entry by entry, insertion order kept.
    Map(Vec<(String, Argument)>),
}

impl Argument {
    /// Classifies a raw tree value.
    ///
    /// Placeholder syntax wins over the `@` prefix: a string containing
    /// `%` anywhere goes down the parameter route even if it also starts
    /// with `@`. Strings like `"100%"` that contain `%` but no wellformed
    /// placeholder classify as [`Argument::Interpolate`] and come out of
    /// interpolation unchanged.
    pub fn classify(value: &Value) -> Argument {
        match value {
            Value::String(text) => Argument::classify_str(text),
            Value::Array(items) => {
                Argument::List(items.iter().map(Argument::classify).collect())
            }
            Value::Object(map) => Argument::Map(
                map.iter()
                    .map(|(key, entry)| (key.clone(), Argument::classify(entry)))
                    .collect(),
            ),
            other => Argument::Literal(other.clone()),
        }
    }

    fn classify_str(text: &str) -> Argument {
        if text.contains('%') {
            if placeholder::is_exact(text) {
                return Argument::ParameterRef(placeholder::exact_path(text).to_string());
            }
            return Argument::Interpolate(text.to_string());
        }
        if let Some(id) = text.strip_prefix('@') {
            return Argument::ServiceRef(id.to_string());
        }
        Argument::Literal(Value::String(text.to_string()))
    }
}

/// A parsed service definition: constructor spec plus positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    ctor: ConstructorSpec,
    args: Vec<Argument>,
}

impl Definition {
    /// Parses the raw tree form: `[ctor-spec, arg, ...]` or a bare
    /// ctor-spec string (zero arguments).
    pub fn parse(id: &str, raw: &Value) -> Result<Definition> {
        match raw {
            Value::String(spec) => Ok(Definition {
                ctor: ConstructorSpec::parse(spec),
                args: Vec::new(),
            }),
            Value::Array(items) => {
                let spec = items.first().ok_or_else(|| DiError::InvalidDefinition {
                    id: id.to_string(),
                    reason: "definition array is empty".to_string(),
                })?;
                let spec = spec.as_str().ok_or_else(|| DiError::InvalidDefinition {
                    id: id.to_string(),
                    reason: format!(
                        "constructor spec must be a string, got {}",
                        rivet_config::value_kind(spec)
                    ),
                })?;
                let args = items[1..].iter().map(Argument::classify).collect();
                Ok(Definition {
                    ctor: ConstructorSpec::parse(spec),
                    args,
                })
            }
            other => Err(DiError::InvalidDefinition {
                id: id.to_string(),
                reason: format!(
                    "expected an array or string, got {}",
                    rivet_config::value_kind(other)
                ),
            }),
        }
    }

    /// A class-constructed definition with no arguments.
    pub fn of_class(class: impl Into<String>) -> Definition {
        Definition {
            ctor: ConstructorSpec::Class(class.into()),
            args: Vec::new(),
        }
    }

    /// A factory-delegated definition with no arguments.
    pub fn of_factory(service: impl Into<String>, method: impl Into<String>) -> Definition {
        Definition {
            ctor: ConstructorSpec::Factory {
                service: service.into(),
                method: method.into(),
            },
            args: Vec::new(),
        }
    }

    /// Appends a positional argument.
    ///
    /// This is the programmatic escape hatch from string classification:
    /// an [`Argument::Literal`] appended here is passed through verbatim
    /// even when it looks like a placeholder or service reference.
    pub fn arg(mut self, argument: Argument) -> Definition {
        self.args.push(argument);
        self
    }

    /// The constructor spec.
    pub fn ctor(&self) -> &ConstructorSpec {
        &self.ctor
    }

    /// The positional arguments, in order.
    pub fn args(&self) -> &[Argument] {
        &self.args
    }
}
