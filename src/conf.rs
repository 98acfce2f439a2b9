//! The parameter registry and the four-source merge.
//!
//! A [`Conf`] owns the full set of [`Param`] descriptors, enforces global
//! uniqueness of names, conffile keys, and command-line options, and
//! resolves values from the four sources in strictly increasing precedence:
//!
//! 1. declared defaults
//! 2. a configuration file
//! 3. environment variables
//! 4. command-line options
//!
//! Every assignment goes through [`Param::validate`], so a value that made
//! it into the registry is coerced and constraint-checked no matter which
//! source it came from.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::cmdline;
use crate::constraint;
use crate::doc;
use crate::env;
use crate::error::ParamError;
use crate::file;
use crate::param::{Param, ParamSpec};
use crate::value::Value;

/// Per-call overrides for [`Conf::acquire_with`]. Unset fields fall back to
/// the registry-level defaults configured on the builder.
#[derive(Debug, Clone, Default)]
pub struct AcquireOverrides {
    /// Parse exactly this file instead of probing the search locations.
    pub config_filename: Option<PathBuf>,
    /// Environment-variable prefix for this acquisition.
    pub env_prefix: Option<String>,
    /// Whether parameters may remain unset after the merge.
    pub allow_unset_values: Option<bool>,
}

/// A registry of typed parameters and their resolved values.
///
/// Built once via [`Conf::builder`], optionally extended with [`add`],
/// then populated by [`acquire`]. The registry is plain single-threaded
/// mutable state; wrap it yourself if you need to share it across threads.
///
/// [`add`]: Conf::add
/// [`acquire`]: Conf::acquire
#[derive(Debug)]
pub struct Conf {
    params: BTreeMap<String, Param>,
    by_conffile: BTreeMap<String, String>,
    short_opts: BTreeMap<char, String>,
    long_opts: BTreeMap<String, String>,
    conf_file_name: Option<String>,
    conf_file_locations: Vec<PathBuf>,
    conf_file_parameter: Option<String>,
    env_prefix: String,
    allow_unset_values: bool,
    doc_section_order: Option<Vec<String>>,
}

impl Conf {
    pub fn builder() -> ConfBuilder {
        ConfBuilder::default()
    }

    /// Declare a parameter.
    ///
    /// Fails when the name, the resolved conffile key, or either resolved
    /// command-line option collides with an existing declaration.
    pub fn add(&mut self, spec: ParamSpec) -> Result<(), ParamError> {
        let name = spec.name.clone();
        if self.params.contains_key(&name) {
            return Err(ParamError::DuplicateParameter {
                name,
                reason: "Duplicate definition.".to_string(),
            });
        }
        let conffile = spec.resolved_conffile();
        if let Some(key) = &conffile
            && self.by_conffile.contains_key(key)
        {
            return Err(ParamError::DuplicateParameter {
                name: key.clone(),
                reason: "Duplicate definition.".to_string(),
            });
        }
        let cmd_line = spec.resolved_cmd_line();
        if let Some((short, long)) = &cmd_line {
            if let Some(c) = short
                && self.short_opts.contains_key(c)
            {
                return Err(ParamError::DuplicateParameter {
                    name,
                    reason: format!("Short option '-{c}' already in use."),
                });
            }
            if let Some(l) = long
                && self.long_opts.contains_key(l)
            {
                return Err(ParamError::DuplicateParameter {
                    name,
                    reason: format!("Long option '--{l}' already in use."),
                });
            }
        }

        let param = Param::new(spec)?;
        if let Some(key) = conffile {
            self.by_conffile.insert(key, name.clone());
        }
        if let Some((short, long)) = cmd_line {
            if let Some(c) = short {
                self.short_opts.insert(c, name.clone());
            }
            if let Some(l) = long {
                self.long_opts.insert(l, name.clone());
            }
        }
        self.params.insert(name, param);
        Ok(())
    }

    /// The current value of a parameter, `None` when nothing has set it.
    pub fn get(&self, name: &str) -> Result<Option<Value>, ParamError> {
        let param = self
            .params
            .get(name)
            .ok_or_else(|| ParamError::UnknownParameter(name.to_string()))?;
        if param.is_ignored() {
            return Err(ParamError::IgnoredParameter(name.to_string()));
        }
        Ok(param.value().cloned())
    }

    /// Validate and store a value. A rejected value leaves the stored value
    /// unchanged.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ParamError> {
        let param = self
            .params
            .get(name)
            .ok_or_else(|| ParamError::UnknownParameter(name.to_string()))?;
        if param.is_ignored() {
            return Err(ParamError::IgnoredParameter(name.to_string()));
        }
        let validated = param.validate(value)?;
        if let Some(param) = self.params.get_mut(name) {
            param.set_value(validated);
        }
        Ok(())
    }

    /// Like [`get`](Conf::get), keyed by the conffile key instead of the
    /// declared name.
    pub fn get_by_conffile_name(&self, key: &str) -> Result<Option<Value>, ParamError> {
        let name = self
            .by_conffile
            .get(key)
            .ok_or_else(|| ParamError::UnknownParameter(key.to_string()))?;
        self.get(name)
    }

    /// Names of all declared parameters, ignored ones excluded.
    pub fn keys(&self) -> Vec<String> {
        self.params
            .values()
            .filter(|p| !p.is_ignored())
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Name and current value of every parameter, ignored ones excluded.
    pub fn items(&self) -> BTreeMap<String, Option<Value>> {
        self.params
            .values()
            .filter(|p| !p.is_ignored())
            .map(|p| (p.name().to_string(), p.value().cloned()))
            .collect()
    }

    /// Access a declared descriptor.
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.get(name)
    }

    /// Resolve values from config file, environment, and command line, then
    /// verify completeness. See [`acquire_with`](Conf::acquire_with).
    pub fn acquire(&mut self, args: &[String]) -> Result<(), ParamError> {
        self.acquire_with(args, AcquireOverrides::default())
    }

    /// [`acquire`](Conf::acquire) with per-call overrides for the config
    /// file, environment prefix, and unset-value policy.
    pub fn acquire_with(
        &mut self,
        args: &[String],
        overrides: AcquireOverrides,
    ) -> Result<(), ParamError> {
        let vars = env::snapshot();
        self.acquire_from(args, overrides, &vars)
    }

    /// Full merge against an explicit environment snapshot, so tests can
    /// pass synthetic data instead of the process environment.
    pub fn acquire_from(
        &mut self,
        args: &[String],
        overrides: AcquireOverrides,
        env_vars: &HashMap<String, String>,
    ) -> Result<(), ParamError> {
        self.config_file_phase(args, overrides.config_filename.as_deref())?;
        self.env_phase(overrides.env_prefix.as_deref(), env_vars)?;
        self.cmd_line_phase(args)?;
        self.completeness_sweep(overrides.allow_unset_values)
    }

    fn config_file_phase(
        &mut self,
        args: &[String],
        explicit: Option<&std::path::Path>,
    ) -> Result<(), ParamError> {
        if let Some(path) = explicit {
            log::debug!("reading config file {}", path.display());
            let content = file::read_explicit(path)?;
            return self.apply_config_text(&content);
        }

        // A conf-file parameter lets the command line (or its own default)
        // pick the file before the config phase runs.
        let mut file_name = self.conf_file_name.clone();
        if let Some(pname) = self.conf_file_parameter.clone() {
            if let Some(picked) = cmdline::prescan_value(self.params.values(), args, &pname) {
                log::debug!("config file picked on the command line: {picked}");
                let path = PathBuf::from(picked);
                let content = file::read_explicit(&path)?;
                return self.apply_config_text(&content);
            }
            if let Some(param) = self.params.get(&pname)
                && let Some(Value::Str(name)) = param.value()
            {
                file_name = Some(name.clone());
            }
        }

        let Some(file_name) = file_name else {
            return Ok(());
        };
        if let Some((path, content)) = file::probe(&self.conf_file_locations, &file_name)? {
            log::debug!("using config file {}", path.display());
            self.apply_config_text(&content)?;
        }
        Ok(())
    }

    /// Parse config-file content: one `KEY value` entry per line, `#` starts
    /// a comment, blank lines are skipped. Errors carry the 1-based line
    /// number.
    fn apply_config_text(&mut self, content: &str) -> Result<(), ParamError> {
        for (idx, raw_line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw_line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let entry = line
                .split_once(char::is_whitespace)
                .map(|(key, rest)| (key, rest.trim()));
            let Some((key, value)) = entry.filter(|(_, v)| !v.is_empty()) else {
                return Err(ParamError::MalformedLine.at_line(line_no));
            };
            let Some(pname) = self.by_conffile.get(key).cloned() else {
                return Err(ParamError::UnknownParameter(key.to_string()).at_line(line_no));
            };
            if self.params.get(&pname).is_some_and(Param::is_ignored) {
                continue;
            }
            self.set(&pname, value).map_err(|e| e.at_line(line_no))?;
        }
        Ok(())
    }

    fn env_phase(
        &mut self,
        prefix_override: Option<&str>,
        vars: &HashMap<String, String>,
    ) -> Result<(), ParamError> {
        let prefix = prefix_override.unwrap_or(&self.env_prefix).to_string();
        let keys: Vec<String> = self
            .by_conffile
            .iter()
            .filter(|(_, name)| self.params.get(*name).is_some_and(|p| !p.is_ignored()))
            .map(|(key, _)| key.clone())
            .collect();
        for (var, key, value) in env::matching(&prefix, keys.iter().map(String::as_str), vars) {
            let Some(pname) = self.by_conffile.get(key).cloned() else {
                continue;
            };
            log::debug!("environment variable {var} sets parameter '{pname}'");
            self.set(&pname, value.as_str())
                .map_err(|e| e.in_env_var(var))?;
        }
        Ok(())
    }

    fn cmd_line_phase(&mut self, args: &[String]) -> Result<(), ParamError> {
        let assignments = cmdline::parse_args(self.params.values(), args)?;
        for (pname, value) in assignments {
            if self.params.get(&pname).is_some_and(Param::is_ignored) {
                continue;
            }
            log::debug!("command line sets parameter '{pname}'");
            self.set(&pname, value)?;
        }
        Ok(())
    }

    /// Post-merge checks: every non-ignored parameter must hold a value
    /// (unless unset values are allowed), and dictionary parameters must
    /// carry all their mandatory keys.
    fn completeness_sweep(&self, allow_unset: Option<bool>) -> Result<(), ParamError> {
        let allow_unset = allow_unset.unwrap_or(self.allow_unset_values);
        for (name, param) in &self.params {
            if param.is_ignored() {
                continue;
            }
            match param.value() {
                None if !allow_unset => return Err(ParamError::MissingValue(name.clone())),
                Some(Value::Dict(dict)) => {
                    constraint::check_mandatory(dict, param.mandatory_keys()).map_err(
                        |source| ParamError::ConstraintViolation {
                            name: name.clone(),
                            source,
                        },
                    )?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Assemble the documentation for all parameters, grouped by section.
    /// Ignored parameters and parameters without a command-line binding are
    /// omitted.
    pub fn make_doc(&self, indent: usize) -> String {
        let entries: Vec<_> = self
            .params
            .values()
            .filter(|p| !p.is_ignored())
            .filter_map(Param::doc)
            .collect();
        doc::assemble(&entries, self.doc_section_order.as_deref(), indent)
    }
}

/// Builder for a [`Conf`] registry: registry-level defaults plus the
/// parameter declarations.
#[derive(Debug, Default)]
pub struct ConfBuilder {
    conf_file_name: Option<String>,
    conf_file_locations: Option<Vec<PathBuf>>,
    conf_file_parameter: Option<String>,
    env_prefix: Option<String>,
    allow_unset_values: bool,
    doc_section_order: Option<Vec<String>>,
    params: Vec<ParamSpec>,
}

impl ConfBuilder {
    /// Default config-file name probed across the search locations.
    pub fn conf_file_name(mut self, name: impl Into<String>) -> Self {
        self.conf_file_name = Some(name.into());
        self
    }

    /// Replace the default search locations (current directory, home,
    /// `/etc`). Locations are probed in order; the first file found wins.
    pub fn conf_file_locations<I, P>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.conf_file_locations = Some(locations.into_iter().map(Into::into).collect());
        self
    }

    /// Name a declared parameter whose value selects the config file. When
    /// its option appears on the command line, that exact file is read
    /// (missing file fatal); otherwise the parameter's default is the file
    /// name probed across the search locations.
    pub fn conf_file_parameter(mut self, name: impl Into<String>) -> Self {
        self.conf_file_parameter = Some(name.into());
        self
    }

    /// Prefix prepended to conffile keys when looking up environment
    /// variables. Defaults to no prefix.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Allow parameters to remain unset after `acquire` (default: `false`).
    pub fn allow_unset_values(mut self, allow: bool) -> Self {
        self.allow_unset_values = allow;
        self
    }

    /// Explicit section order for [`Conf::make_doc`]. Sections not listed
    /// are omitted from the output.
    pub fn doc_section_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.doc_section_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    /// Declare a parameter.
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn build(self) -> Result<Conf, ParamError> {
        let mut conf = Conf {
            params: BTreeMap::new(),
            by_conffile: BTreeMap::new(),
            short_opts: BTreeMap::new(),
            long_opts: BTreeMap::new(),
            conf_file_name: self.conf_file_name,
            conf_file_locations: self
                .conf_file_locations
                .unwrap_or_else(file::default_locations),
            conf_file_parameter: self.conf_file_parameter,
            env_prefix: self.env_prefix.unwrap_or_default(),
            allow_unset_values: self.allow_unset_values,
            doc_section_order: self.doc_section_order,
        };
        for spec in self.params {
            conf.add(spec)?;
        }
        if let Some(pname) = &conf.conf_file_parameter
            && !conf.params.contains_key(pname)
        {
            return Err(ParamError::UnknownParameter(pname.clone()));
        }
        Ok(conf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{args, sample_conf};
    use crate::param::{DocSpec, ParamSpec};
    use crate::value::{DictValue, ParamType};
    use std::fs;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn get_returns_defaults() {
        let conf = sample_conf();
        assert_eq!(conf.get("foo").unwrap(), Some(Value::Str("some-value".into())));
        assert_eq!(conf.get("baz").unwrap(), Some(Value::Int(123)));
        assert_eq!(conf.get("ggg").unwrap(), None);
    }

    #[test]
    fn get_unknown_parameter() {
        let conf = sample_conf();
        assert_eq!(
            conf.get("bar").unwrap_err().to_string(),
            "Parameter 'bar': Unknown parameter."
        );
    }

    #[test]
    fn keys_are_sorted_and_complete() {
        let conf = sample_conf();
        assert_eq!(conf.keys(), vec!["baz", "ddd", "foo", "ggg"]);
    }

    #[test]
    fn items_pair_names_with_values() {
        let conf = sample_conf();
        let items = conf.items();
        assert_eq!(items["foo"], Some(Value::Str("some-value".into())));
        assert_eq!(items["baz"], Some(Value::Int(123)));
        assert_eq!(items["ggg"], None);
    }

    #[test]
    fn get_by_conffile_name_resolves_keys() {
        let conf = sample_conf();
        assert_eq!(conf.get_by_conffile_name("GGG").unwrap(), None);
        assert_eq!(
            conf.get_by_conffile_name("MY_PARAM").unwrap(),
            Some(Value::Str("some-value".into()))
        );
        assert_eq!(conf.get_by_conffile_name("BAZ").unwrap(), Some(Value::Int(123)));
        assert!(conf.get_by_conffile_name("NOPE").is_err());
    }

    #[test]
    fn set_validates_and_stores() {
        let mut conf = sample_conf();
        conf.set("baz", 40).unwrap();
        assert_eq!(conf.get("baz").unwrap(), Some(Value::Int(40)));
    }

    #[test]
    fn rejected_set_leaves_value_unchanged() {
        let mut conf = sample_conf();
        assert_eq!(
            conf.set("baz", "foo").unwrap_err().to_string(),
            "Parameter 'baz': Cannot convert 'foo' to type 'integer'."
        );
        assert_eq!(
            conf.set("baz", 444).unwrap_err().to_string(),
            "Parameter 'baz': '444' is not in the allowed range."
        );
        assert_eq!(conf.get("baz").unwrap(), Some(Value::Int(123)));
    }

    #[test]
    fn set_coerces_list_inputs() {
        let mut conf = Conf::builder()
            .param(ParamSpec::new("lll").param_type(ParamType::StrList))
            .build()
            .unwrap();
        conf.set("lll", "xyz").unwrap();
        assert_eq!(conf.get("lll").unwrap(), Some(Value::from(vec!["xyz"])));
        conf.set("lll", ",x,y,").unwrap();
        assert_eq!(
            conf.get("lll").unwrap(),
            Some(Value::from(vec!["", "x", "y", ""]))
        );
        assert!(conf.set("lll", 123).is_err());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut conf = sample_conf();
        let err = conf.add(ParamSpec::new("foo")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter 'foo': Duplicate definition."
        );
    }

    #[test]
    fn duplicate_short_option_rejected() {
        let mut conf = sample_conf();
        let err = conf
            .add(ParamSpec::new("ttt").cmd_line(Some('f'), None))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter 'ttt': Short option '-f' already in use."
        );
    }

    #[test]
    fn duplicate_long_option_rejected() {
        let mut conf = sample_conf();
        let err = conf
            .add(ParamSpec::new("ttt").cmd_line(None, Some("some-param")))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter 'ttt': Long option '--some-param' already in use."
        );
    }

    #[test]
    fn duplicate_conffile_key_rejected() {
        let mut conf = sample_conf();
        let err = conf
            .add(ParamSpec::new("other").conffile("MY_PARAM").no_cmd_line())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter 'MY_PARAM': Duplicate definition."
        );
    }

    #[test]
    fn declaration_order_does_not_matter_for_collisions() {
        // The second declaration loses, whichever way around they arrive.
        let err = Conf::builder()
            .param(ParamSpec::new("beta").cmd_line(Some('x'), None))
            .param(ParamSpec::new("alpha").cmd_line(Some('x'), None))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("'alpha'"), "{err}");
    }

    #[test]
    fn added_parameter_gets_derived_bindings() {
        let mut conf = sample_conf();
        conf.add(ParamSpec::new("zip-bar")).unwrap();
        let p = conf.param("zip-bar").unwrap();
        assert_eq!(
            p.make_getopts_str(),
            (Some("z:".into()), Some("zip-bar=".into()))
        );
        assert_eq!(p.conffile(), Some("ZIP_BAR"));
        conf.set("zip-bar", "foo").unwrap();
        assert_eq!(
            conf.get_by_conffile_name("ZIP_BAR").unwrap(),
            Some(Value::Str("foo".into()))
        );
    }

    // -- Config-file parsing ------------------------------------------------

    #[test]
    fn config_text_with_comments_and_spacing() {
        let mut conf = sample_conf();
        conf.apply_config_text(
            "\n\
             \x20# empty lines and comments and stuff with odd indentation\n\
             MY_PARAM     xyz baz\n\
             \n\
             \x20  MY_DICT     { bar : 123; baz : foo,bar,   blah  , fff ; }   # trailing comment\n\
             \x20    # some comment\n\
             \x20GGG   yes     # comment at end of line\n",
        )
        .unwrap();

        assert_eq!(conf.get("foo").unwrap(), Some(Value::Str("xyz baz".into())));
        assert_eq!(conf.get("ggg").unwrap(), Some(Value::Bool(true)));
        let value = conf.get("ddd").unwrap().unwrap();
        let dict = value.as_dict().unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict["bar"], DictValue::from("123"));
        assert_eq!(dict["baz"], DictValue::from(vec!["foo", "bar", "blah", "fff"]));
    }

    #[test]
    fn config_text_unknown_key_names_line() {
        let mut conf = sample_conf();
        let err = conf
            .apply_config_text("\n\n# comment\nFOO xyz\n")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Line 4: Parameter 'FOO': Unknown parameter."
        );
    }

    #[test]
    fn config_text_invalid_value_names_line() {
        let mut conf = sample_conf();
        let err = conf.apply_config_text("\nMY_PARAM xyz\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Line 2: Parameter 'foo': 'xyz' is not one of the allowed values."
        );
    }

    #[test]
    fn config_text_key_without_value_is_malformed() {
        let mut conf = sample_conf();
        let err = conf.apply_config_text("MY_PARAM\n").unwrap_err();
        assert_eq!(err.to_string(), "Line 1: Malformed line.");
    }

    #[test]
    fn config_text_multi_line_dict_is_unsupported() {
        // One physical line is one complete entry; a brace value spanning
        // lines fails on the opening line.
        let mut conf = sample_conf();
        let err = conf
            .apply_config_text("MY_DICT {\n    bar : 123 ;\n}\n")
            .unwrap_err();
        assert!(err.to_string().starts_with("Line 1: "), "{err}");
    }

    // -- Environment phase --------------------------------------------------

    #[test]
    fn env_values_set_parameters() {
        let mut conf = sample_conf();
        let vars = env(&[
            ("FOOBAR_MY_PARAM", "something-else"),
            ("FOOBAR_GGG", "y"),
            ("FOOBAR_SOMETHING_UNKNOWN", "foo"),
        ]);
        conf.env_phase(Some("FOOBAR_"), &vars).unwrap();
        assert_eq!(
            conf.get("foo").unwrap(),
            Some(Value::Str("something-else".into()))
        );
        assert_eq!(conf.get("ggg").unwrap(), Some(Value::Bool(true)));
    }

    #[test]
    fn env_error_names_the_variable() {
        let mut conf = sample_conf();
        let vars = env(&[("FOOBAR_MY_PARAM", "ggg")]);
        let err = conf.env_phase(Some("FOOBAR_"), &vars).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable FOOBAR_MY_PARAM: Parameter 'foo': 'ggg' is not one of the allowed values."
        );
    }

    // -- Command-line phase -------------------------------------------------

    #[test]
    fn cmd_line_sets_parameters() {
        let mut conf = sample_conf();
        conf.cmd_line_phase(&args(&[
            "--some-param=foobar",
            "-g",
            "--baz",
            "200",
            "-Q",
            "{ foo:123 ; bar:1, 2,3; a: X  Y Z }",
        ]))
        .unwrap();
        assert_eq!(conf.get("foo").unwrap(), Some(Value::Str("foobar".into())));
        assert_eq!(conf.get("baz").unwrap(), Some(Value::Int(200)));
        assert_eq!(conf.get("ggg").unwrap(), Some(Value::Bool(true)));
        let value = conf.get("ddd").unwrap().unwrap();
        let dict = value.as_dict().unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict["foo"], DictValue::from("123"));
        assert_eq!(dict["bar"], DictValue::from(vec!["1", "2", "3"]));
        assert_eq!(dict["a"], DictValue::from("X  Y Z"));
    }

    #[test]
    fn cmd_line_unknown_option_fails() {
        let mut conf = sample_conf();
        let err = conf.cmd_line_phase(&args(&["--xyz=blah"])).unwrap_err();
        assert!(err.to_string().starts_with("Command line option: "), "{err}");
    }

    #[test]
    fn cmd_line_invalid_value_names_parameter() {
        let mut conf = sample_conf();
        let err = conf
            .cmd_line_phase(&args(&["--some-param=blah", "-g", "--baz", "200"]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter 'foo': 'blah' is not one of the allowed values."
        );
    }

    // -- Full acquire -------------------------------------------------------

    #[test]
    fn acquire_precedence_file_env_cmdline() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("t1.conf"), "MY_PARAM foobar\n").unwrap();

        let make = || {
            let mut conf = sample_conf();
            conf.conf_file_name = Some("t1.conf".to_string());
            conf.conf_file_locations = vec![dir.path().to_path_buf()];
            conf
        };
        let vars = env(&[("FOOBAR_MY_PARAM", "something-else"), ("FOOBAR_GGG", "yes")]);
        let overrides = || AcquireOverrides {
            env_prefix: Some("FOOBAR_".to_string()),
            ..AcquireOverrides::default()
        };

        // File value only.
        let mut conf = make();
        conf.acquire_from(&args(&[]), overrides(), &env(&[("FOOBAR_GGG", "yes")]))
            .unwrap();
        assert_eq!(conf.get("foo").unwrap(), Some(Value::Str("foobar".into())));

        // Environment overrides the file.
        let mut conf = make();
        conf.acquire_from(&args(&[]), overrides(), &vars).unwrap();
        assert_eq!(
            conf.get("foo").unwrap(),
            Some(Value::Str("something-else".into()))
        );
        assert_eq!(conf.get("ggg").unwrap(), Some(Value::Bool(true)));

        // Command line overrides the environment.
        let mut conf = make();
        conf.acquire_from(&args(&["-f", "some-value"]), overrides(), &vars)
            .unwrap();
        assert_eq!(conf.get("foo").unwrap(), Some(Value::Str("some-value".into())));
    }

    #[test]
    fn acquire_missing_value_is_fatal() {
        let mut conf = sample_conf();
        conf.conf_file_name = None;
        let err = conf
            .acquire_from(&args(&[]), AcquireOverrides::default(), &env(&[]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter 'ggg': Requires a value, nothing has been set."
        );
    }

    #[test]
    fn acquire_allow_unset_leaves_value_none() {
        let mut conf = sample_conf();
        conf.conf_file_name = None;
        conf.acquire_from(
            &args(&[]),
            AcquireOverrides {
                allow_unset_values: Some(true),
                ..AcquireOverrides::default()
            },
            &env(&[]),
        )
        .unwrap();
        assert_eq!(conf.get("ggg").unwrap(), None);
    }

    #[test]
    fn acquire_explicit_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let mut conf = sample_conf();
        let err = conf
            .acquire_from(
                &args(&[]),
                AcquireOverrides {
                    config_filename: Some(dir.path().join("nope.conf")),
                    allow_unset_values: Some(true),
                    ..AcquireOverrides::default()
                },
                &env(&[]),
            )
            .unwrap_err();
        assert!(err.to_string().contains("nope.conf"));
    }

    #[test]
    fn acquire_probes_locations_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("t1.conf"), "MY_PARAM foobar\n").unwrap();
        fs::write(second.path().join("t1.conf"), "MY_PARAM something-else\n").unwrap();

        let mut conf = sample_conf();
        conf.conf_file_name = Some("t1.conf".to_string());
        conf.conf_file_locations = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        conf.acquire_from(
            &args(&[]),
            AcquireOverrides {
                allow_unset_values: Some(true),
                ..AcquireOverrides::default()
            },
            &env(&[]),
        )
        .unwrap();
        assert_eq!(conf.get("foo").unwrap(), Some(Value::Str("foobar".into())));
    }

    #[test]
    fn mandatory_keys_checked_after_merge() {
        let mut conf = Conf::builder()
            .allow_unset_values(true)
            .param(
                ParamSpec::new("ddd")
                    .param_type(ParamType::StrDict)
                    .mandatory_keys(["aaa"])
                    .cmd_line(Some('d'), Some("ddd"))
                    .no_conffile(),
            )
            .build()
            .unwrap();
        let err = conf
            .acquire_from(
                &args(&["--ddd", "{ bbb : 1 }"]),
                AcquireOverrides::default(),
                &env(&[]),
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter 'ddd': Mandatory key 'aaa' is missing."
        );

        conf.set("ddd", "{ aaa : 1 ; bbb : 2 }").unwrap();
        conf.acquire_from(&args(&[]), AcquireOverrides::default(), &env(&[]))
            .unwrap();
    }

    #[test]
    fn conf_file_parameter_picks_file_from_cmd_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picked.conf");
        fs::write(&path, "MY_PARAM foobar\n").unwrap();

        let mut conf = Conf::builder()
            .conf_file_parameter("conffile")
            .allow_unset_values(true)
            .param(
                ParamSpec::new("conffile")
                    .default("myproject.conf")
                    .cmd_line(None, Some("conffile"))
                    .no_conffile(),
            )
            .param(
                ParamSpec::new("foo")
                    .conffile("MY_PARAM")
                    .cmd_line(Some('f'), Some("foo")),
            )
            .build()
            .unwrap();
        conf.acquire_from(
            &args(&["--conffile", path.to_str().unwrap()]),
            AcquireOverrides::default(),
            &env(&[]),
        )
        .unwrap();
        assert_eq!(conf.get("foo").unwrap(), Some(Value::Str("foobar".into())));
    }

    #[test]
    fn conf_file_parameter_default_is_probed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("myproject.conf"), "MY_PARAM foobar\n").unwrap();

        let mut conf = Conf::builder()
            .conf_file_parameter("conffile")
            .conf_file_locations([dir.path().to_path_buf()])
            .allow_unset_values(true)
            .param(
                ParamSpec::new("conffile")
                    .default("myproject.conf")
                    .cmd_line(None, Some("conffile"))
                    .no_conffile(),
            )
            .param(
                ParamSpec::new("foo")
                    .conffile("MY_PARAM")
                    .cmd_line(Some('f'), Some("foo")),
            )
            .build()
            .unwrap();
        conf.acquire_from(&args(&[]), AcquireOverrides::default(), &env(&[]))
            .unwrap();
        assert_eq!(conf.get("foo").unwrap(), Some(Value::Str("foobar".into())));
    }

    #[test]
    fn conf_file_parameter_without_cmd_line_probes_default() {
        // A conf-file parameter may exist only to carry the default file
        // name, with no command-line binding at all.
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("myproject.conf"), "MY_PARAM foobar\n").unwrap();

        let mut conf = Conf::builder()
            .conf_file_parameter("conffile")
            .conf_file_locations([dir.path().to_path_buf()])
            .allow_unset_values(true)
            .param(
                ParamSpec::new("conffile")
                    .default("myproject.conf")
                    .no_cmd_line()
                    .no_conffile(),
            )
            .param(
                ParamSpec::new("foo")
                    .conffile("MY_PARAM")
                    .cmd_line(Some('f'), Some("foo")),
            )
            .build()
            .unwrap();
        conf.acquire_from(&args(&[]), AcquireOverrides::default(), &env(&[]))
            .unwrap();
        assert_eq!(conf.get("foo").unwrap(), Some(Value::Str("foobar".into())));
    }

    #[test]
    fn conf_file_parameter_must_be_declared() {
        let err = Conf::builder()
            .conf_file_parameter("nope")
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "Parameter 'nope': Unknown parameter.");
    }

    // -- Ignored parameters -------------------------------------------------

    fn conf_with_ignored() -> Conf {
        Conf::builder()
            .allow_unset_values(true)
            .param(ParamSpec::new("active").conffile("ACTIVE").cmd_line(Some('a'), Some("active")))
            .param(
                ParamSpec::new("legacy")
                    .conffile("LEGACY")
                    .cmd_line(Some('l'), Some("legacy"))
                    .ignore(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn ignored_value_access_raises_distinct_signal() {
        let mut conf = conf_with_ignored();
        assert!(conf.get("legacy").unwrap_err().is_ignored());
        assert!(conf.set("legacy", "x").unwrap_err().is_ignored());
    }

    #[test]
    fn ignored_excluded_from_enumeration() {
        let conf = conf_with_ignored();
        assert_eq!(conf.keys(), vec!["active"]);
        assert!(!conf.items().contains_key("legacy"));
    }

    #[test]
    fn ignored_config_file_key_is_skipped() {
        let mut conf = conf_with_ignored();
        conf.apply_config_text("LEGACY anything\nACTIVE kept\n")
            .unwrap();
        assert_eq!(conf.get("active").unwrap(), Some(Value::Str("kept".into())));
    }

    #[test]
    fn ignored_environment_variable_is_skipped() {
        let mut conf = conf_with_ignored();
        let vars = env(&[("LEGACY", "anything")]);
        conf.env_phase(None, &vars).unwrap();
        assert!(conf.get("legacy").unwrap_err().is_ignored());
    }

    #[test]
    fn ignored_option_recognized_but_not_assigned() {
        let mut conf = conf_with_ignored();
        conf.cmd_line_phase(&args(&["--legacy", "anything", "--active", "kept"]))
            .unwrap();
        assert_eq!(conf.get("active").unwrap(), Some(Value::Str("kept".into())));
    }

    #[test]
    fn ignored_excluded_from_completeness_sweep() {
        let conf = conf_with_ignored();
        // "legacy" has no value, but the sweep must not trip over it.
        conf.completeness_sweep(Some(true)).unwrap();
    }

    // -- Documentation ------------------------------------------------------

    #[test]
    fn make_doc_full_output() {
        let conf = sample_conf();
        // Separator lines between entries carry the entry indent.
        let expected = [
            "General:",
            "    -f <the foo value>, --some-param=<the foo value>",
            "        The description string here is long and will automatically be",
            "        wrapped across multiple lines.",
            "        Default value: some-value",
            "        Conf file equivalent: MY_PARAM",
            "    ",
            "    -g",
            "        Flag control run of foobar.",
            "        Conf file equivalent: GGG",
            "    ",
            "    -Q <the ddd value>",
            "        A dict value.",
            "        Default value: { baz: 123 }",
            "        Conf file equivalent: MY_DICT",
            "",
            "Specific parameters:",
            "    -b <num>, --baz=<num>",
            "        Amount of baz gizmos to add.",
            "        Default value: 123",
            "        Conf file equivalent: BAZ",
        ]
        .join("\n");
        assert_eq!(conf.make_doc(0), expected);
    }

    #[test]
    fn make_doc_honors_explicit_section_order() {
        let mut conf = sample_conf();
        conf.doc_section_order =
            Some(vec!["Specific parameters".to_string(), "General".to_string()]);
        let out = conf.make_doc(0);
        let specific = out.find("Specific parameters:").unwrap();
        let general = out.find("General:").unwrap();
        assert!(specific < general);
    }

    #[test]
    fn make_doc_omits_unmentioned_sections() {
        let mut conf = sample_conf();
        conf.doc_section_order = Some(vec!["General".to_string()]);
        let out = conf.make_doc(0);
        assert!(!out.contains("Specific parameters:"));
    }

    #[test]
    fn make_doc_skips_parameters_without_cmd_line() {
        let conf = Conf::builder()
            .param(ParamSpec::new("hidden").no_cmd_line())
            .param(
                ParamSpec::new("shown")
                    .cmd_line(Some('s'), None)
                    .doc(DocSpec::new("Shown.")),
            )
            .build()
            .unwrap();
        let out = conf.make_doc(0);
        assert!(out.contains("-s"));
        assert!(!out.contains("hidden"));
    }
}
