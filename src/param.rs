//! Single-parameter declarations and descriptors.
//!
//! A [`ParamSpec`] is the builder-style declaration callers hand to the
//! registry; a [`Param`] is the resolved descriptor the registry owns. The
//! split keeps the "caller omitted this field" state (auto-derive the
//! conffile key or command-line options from the name) distinct from an
//! explicit opt-out, without magic sentinel values.

use std::collections::BTreeMap;

use crate::coerce;
use crate::constraint;
use crate::doc;
use crate::error::ParamError;
use crate::value::{DictValue, ParamType, Value};

/// Tri-state for declaration fields that are auto-derived when omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) enum Binding<T> {
    /// Caller omitted the field; derive it from the parameter name.
    #[default]
    Auto,
    /// Caller explicitly disabled the binding.
    Off,
    /// Caller provided the binding.
    Explicit(T),
}

/// Documentation metadata for one parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocSpec {
    pub(crate) text: String,
    pub(crate) section: Option<String>,
    pub(crate) argname: Option<String>,
}

impl DocSpec {
    pub fn new(text: impl Into<String>) -> Self {
        DocSpec {
            text: text.into(),
            ..DocSpec::default()
        }
    }

    /// Group this parameter under a named section in the assembled doc.
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Placeholder name for the option's value, rendered as `<argname>`.
    pub fn argname(mut self, argname: impl Into<String>) -> Self {
        self.argname = Some(argname.into());
        self
    }
}

/// Declaration of one parameter, consumed by the registry.
///
/// ```
/// use confit::{DocSpec, ParamSpec, ParamType};
///
/// let spec = ParamSpec::new("quantity")
///     .param_type(ParamType::Int)
///     .default(123)
///     .allowed_range(1, 200)
///     .doc(DocSpec::new("Amount of gizmos to add.").argname("num"));
/// ```
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub(crate) name: String,
    pub(crate) param_type: ParamType,
    pub(crate) default: Option<Value>,
    pub(crate) allowed_values: Option<Vec<Value>>,
    pub(crate) allowed_range: Option<(Value, Value)>,
    pub(crate) allowed_keys: Option<Vec<String>>,
    pub(crate) mandatory_keys: Vec<String>,
    pub(crate) default_key: Option<String>,
    pub(crate) conffile: Binding<String>,
    pub(crate) cmd_line: Binding<(Option<char>, Option<String>)>,
    pub(crate) ignore: bool,
    pub(crate) doc_spec: Option<DocSpec>,
}

impl ParamSpec {
    /// Start a declaration. The type defaults to string.
    pub fn new(name: impl Into<String>) -> Self {
        ParamSpec {
            name: name.into(),
            param_type: ParamType::Str,
            default: None,
            allowed_values: None,
            allowed_range: None,
            allowed_keys: None,
            mandatory_keys: Vec::new(),
            default_key: None,
            conffile: Binding::Auto,
            cmd_line: Binding::Auto,
            ignore: false,
            doc_spec: None,
        }
    }

    pub fn param_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Restrict the parameter (per element, for lists) to this set of values.
    pub fn allowed_values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict the parameter (per element, for lists) to `min..=max`.
    pub fn allowed_range(mut self, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        self.allowed_range = Some((min.into(), max.into()));
        self
    }

    /// Restrict which keys a dictionary parameter may carry.
    pub fn allowed_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Keys that must be present once the merge completes.
    pub fn mandatory_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mandatory_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Key that an unqualified scalar value populates on a dictionary
    /// parameter.
    pub fn default_key(mut self, key: impl Into<String>) -> Self {
        self.default_key = Some(key.into());
        self
    }

    /// Use an explicit config-file (and environment-variable) key instead of
    /// the auto-derived one.
    pub fn conffile(mut self, key: impl Into<String>) -> Self {
        self.conffile = Binding::Explicit(key.into());
        self
    }

    /// Disable the config-file and environment-variable binding.
    pub fn no_conffile(mut self) -> Self {
        self.conffile = Binding::Off;
        self
    }

    /// Use explicit short/long command-line options instead of the
    /// auto-derived pair. Either side may be absent.
    pub fn cmd_line(mut self, short: Option<char>, long: Option<&str>) -> Self {
        self.cmd_line = Binding::Explicit((short, long.map(str::to_string)));
        self
    }

    /// Disable the command-line binding entirely.
    pub fn no_cmd_line(mut self) -> Self {
        self.cmd_line = Binding::Off;
        self
    }

    /// Mark the parameter inert: merge sources skip it, value access raises
    /// the ignored signal, enumeration omits it.
    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    pub fn doc(mut self, doc_spec: DocSpec) -> Self {
        self.doc_spec = Some(doc_spec);
        self
    }

    /// The conffile key this declaration resolves to: the explicit key, the
    /// upper-cased name with `-` replaced by `_`, or nothing.
    pub(crate) fn resolved_conffile(&self) -> Option<String> {
        match &self.conffile {
            Binding::Auto => Some(self.name.to_uppercase().replace('-', "_")),
            Binding::Off => None,
            Binding::Explicit(key) => Some(key.clone()),
        }
    }

    /// The command-line options this declaration resolves to. Auto-derived
    /// options use the name's first letter as the short option and the full
    /// name as the long option; single-letter names get no long option.
    pub(crate) fn resolved_cmd_line(&self) -> Option<(Option<char>, Option<String>)> {
        let resolved = match &self.cmd_line {
            Binding::Auto => {
                let short = self.name.chars().next();
                let long = (self.name.chars().count() > 1).then(|| self.name.clone());
                (short, long)
            }
            Binding::Off => return None,
            Binding::Explicit(pair) => pair.clone(),
        };
        // An explicit (None, None) is the same as no binding.
        match resolved {
            (None, None) => None,
            other => Some(other),
        }
    }
}

/// A declared parameter with its resolved bindings and current value.
#[derive(Debug, Clone)]
pub struct Param {
    name: String,
    param_type: ParamType,
    default: Option<Value>,
    value: Option<Value>,
    allowed_values: Option<Vec<Value>>,
    allowed_range: Option<(Value, Value)>,
    allowed_keys: Option<Vec<String>>,
    mandatory_keys: Vec<String>,
    default_key: Option<String>,
    conffile: Option<String>,
    cmd_line: Option<(Option<char>, Option<String>)>,
    ignore: bool,
    doc_spec: Option<DocSpec>,
}

impl Param {
    /// Resolve a declaration into a descriptor, validating its shape and
    /// type-checking constraint values and the default.
    pub(crate) fn new(spec: ParamSpec) -> Result<Param, ParamError> {
        let name = spec.name.clone();
        let malformed = |reason: &str| ParamError::MalformedSpec {
            name: name.clone(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(malformed("Parameter name must not be empty."));
        }
        match spec.param_type {
            ParamType::Bool if spec.allowed_values.is_some() || spec.allowed_range.is_some() => {
                return Err(malformed("Allowed values or range not allowed for boolean."));
            }
            ParamType::StrDict
                if spec.allowed_values.is_some() || spec.allowed_range.is_some() =>
            {
                return Err(malformed(
                    "Allowed values or range not allowed for dictionary.",
                ));
            }
            _ => {}
        }
        if spec.param_type != ParamType::StrDict
            && (spec.allowed_keys.is_some()
                || !spec.mandatory_keys.is_empty()
                || spec.default_key.is_some())
        {
            return Err(malformed(
                "Key constraints only apply to dictionary parameters.",
            ));
        }
        if let Some(default_key) = &spec.default_key
            && let Some(allowed) = &spec.allowed_keys
            && !allowed.contains(default_key)
        {
            return Err(ParamError::MalformedSpec {
                name: name.clone(),
                reason: format!("Default key '{default_key}' is not one of the allowed keys."),
            });
        }

        // Resolve the bindings before the constraint coercion below starts
        // moving fields out of the declaration.
        let conffile = spec.resolved_conffile();
        let cmd_line = spec.resolved_cmd_line();

        let element_type = spec.param_type.element_type();
        let coerce_elem = |value: Value| {
            coerce::coerce(value, element_type).map_err(|source| ParamError::TypeConversion {
                name: name.clone(),
                source,
            })
        };

        let allowed_values = match spec.allowed_values {
            Some(values) => Some(
                values
                    .into_iter()
                    .map(|v| coerce_elem(v))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };
        let allowed_range = match spec.allowed_range {
            Some((min, max)) => Some((coerce_elem(min)?, coerce_elem(max)?)),
            None => None,
        };

        let mut param = Param {
            name,
            param_type: spec.param_type,
            default: None,
            value: None,
            allowed_values,
            allowed_range,
            allowed_keys: spec.allowed_keys,
            mandatory_keys: spec.mandatory_keys,
            default_key: spec.default_key,
            conffile,
            cmd_line,
            ignore: spec.ignore,
            doc_spec: spec.doc_spec,
        };
        if let Some(default) = spec.default {
            let validated = param.validate(default)?;
            param.default = Some(validated.clone());
            param.value = Some(validated);
        }
        Ok(param)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn conffile(&self) -> Option<&str> {
        self.conffile.as_deref()
    }

    pub fn cmd_line(&self) -> Option<(Option<char>, Option<&str>)> {
        self.cmd_line
            .as_ref()
            .map(|(short, long)| (*short, long.as_deref()))
    }

    pub fn is_ignored(&self) -> bool {
        self.ignore
    }

    pub(crate) fn mandatory_keys(&self) -> &[String] {
        &self.mandatory_keys
    }

    pub(crate) fn set_value(&mut self, value: Value) {
        self.value = Some(value);
    }

    /// Coerce and constraint-check a raw value.
    ///
    /// Ignored parameters return the input unchanged without any checking.
    /// `allowed_values` takes precedence; a co-declared `allowed_range` is
    /// only evaluated when no value enumeration exists.
    pub fn validate(&self, raw: impl Into<Value>) -> Result<Value, ParamError> {
        let raw = raw.into();
        if self.ignore {
            return Ok(raw);
        }
        let raw = self.apply_default_key(raw);
        let value = coerce::coerce(raw, self.param_type).map_err(|source| {
            ParamError::TypeConversion {
                name: self.name.clone(),
                source,
            }
        })?;

        let values = self.allowed_values.as_deref();
        let range = if values.is_some() {
            None
        } else {
            self.allowed_range.as_ref()
        };
        constraint::check(&value, values, range).map_err(|source| {
            ParamError::ConstraintViolation {
                name: self.name.clone(),
                source,
            }
        })?;
        if let Value::Dict(dict) = &value {
            constraint::check_keys(dict, self.allowed_keys.as_deref()).map_err(|source| {
                ParamError::ConstraintViolation {
                    name: self.name.clone(),
                    source,
                }
            })?;
        }
        Ok(value)
    }

    /// An unqualified scalar assigned to a dictionary parameter populates the
    /// declared default key.
    fn apply_default_key(&self, raw: Value) -> Value {
        if self.param_type != ParamType::StrDict {
            return raw;
        }
        let Some(default_key) = &self.default_key else {
            return raw;
        };
        let Value::Str(text) = &raw else {
            return raw;
        };
        if text.trim_start().starts_with('{') {
            return raw;
        }
        let value = if text.contains(',') {
            DictValue::List(text.split(',').map(|v| v.trim().to_string()).collect())
        } else {
            DictValue::Str(text.trim().to_string())
        };
        let mut map = BTreeMap::new();
        map.insert(default_key.clone(), value);
        Value::Dict(map)
    }

    /// Short and long option strings suitable for a POSIX-style option
    /// parser: value-taking types get a trailing `:` (short) or `=` (long),
    /// booleans are bare.
    pub fn make_getopts_str(&self) -> (Option<String>, Option<String>) {
        let Some((short, long)) = &self.cmd_line else {
            return (None, None);
        };
        let (short_marker, long_marker) = if self.param_type.takes_cmd_value() {
            (":", "=")
        } else {
            ("", "")
        };
        (
            short.map(|c| format!("{c}{short_marker}")),
            long.as_ref().map(|l| format!("{l}{long_marker}")),
        )
    }

    /// Render this parameter's documentation entry as `(section, text)`.
    ///
    /// Parameters with no command-line binding emit no documentation.
    pub fn doc(&self) -> Option<(Option<String>, String)> {
        let (short, long) = self.cmd_line.as_ref()?;
        let empty = DocSpec::default();
        let spec = self.doc_spec.as_ref().unwrap_or(&empty);
        let argname = spec.argname.as_deref().unwrap_or("val");
        let takes_value = self.param_type.takes_cmd_value();

        let mut parts = Vec::new();
        if let Some(c) = short {
            parts.push(if takes_value {
                format!("-{c} <{argname}>")
            } else {
                format!("-{c}")
            });
        }
        if let Some(l) = long {
            parts.push(if takes_value {
                format!("--{l}=<{argname}>")
            } else {
                format!("--{l}")
            });
        }
        let mut text = parts.join(", ");
        text.push('\n');

        for line in spec.text.lines() {
            let subsequent = if line.trim_start().starts_with('*') {
                "      "
            } else {
                "    "
            };
            for wrapped in doc::wrap(line, "    ", subsequent, doc::WRAP_WIDTH) {
                text.push_str(&wrapped);
                text.push('\n');
            }
        }
        if let Some(default) = &self.default {
            text.push_str(&format!("    Default value: {default}\n"));
        }
        if let Some(conffile) = &self.conffile {
            text.push_str(&format!("    Conf file equivalent: {conffile}\n"));
        }
        Some((spec.section.clone(), text))
    }
}
