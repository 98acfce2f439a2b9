//! Layered parameter resolution for command-line programs. Declare your
//! parameters once, then acquire their values from every place users expect
//! to set them.
//!
//! Confit merges four sources in strictly increasing precedence: declared
//! defaults, a configuration file, environment variables, and command-line
//! options.
//!
//! ```
//! use confit::{Conf, ParamSpec, ParamType};
//!
//! let mut conf = Conf::builder()
//!     .conf_file_name("my-demo-app.conf")
//!     .env_prefix("MY_DEMO_APP_")
//!     .param(ParamSpec::new("host").default("localhost"))
//!     .param(ParamSpec::new("port").param_type(ParamType::Int).default(8080))
//!     .build()?;
//! conf.acquire(&[])?;
//! assert_eq!(conf.get("port")?, Some(8080.into()));
//! # Ok::<(), confit::ParamError>(())
//! ```
//!
//! That single `acquire` call probes the current directory, the user's home
//! directory, and `/etc` for `my-demo-app.conf`, applies `MY_DEMO_APP_HOST`
//! and `MY_DEMO_APP_PORT` from the environment, parses the command line, and
//! checks that every parameter ended up with a value.
//!
//! # Design: declaration as source of truth
//!
//! A [`ParamSpec`] declaration is the schema for everything:
//!
//! - the **config-file key** and **environment variable** default to the
//!   upper-cased parameter name (`zip-bar` becomes `ZIP_BAR`),
//! - the **command-line options** default to the name's first letter and the
//!   full name (`-z` / `--zip-bar`),
//! - the declared **type** drives value coercion from every text source, so
//!   `PORT 8080` in a file, `MYAPP_PORT=8080`, and `--port 8080` all land as
//!   the same integer,
//! - **constraints** (value enumerations, ranges, dictionary keys) are
//!   enforced on assignment no matter where the value came from,
//! - the **doc metadata** feeds [`Conf::make_doc`], which assembles the
//!   option documentation for your `--help` output.
//!
//! There is no separate schema file and no chance of the documentation
//! drifting from the declarations.
//!
//! # Error attribution
//!
//! Every rejected value names its source: `Line 3: Parameter 'foo': ...` for
//! config files, `Environment variable MYAPP_FOO: ...` for the environment,
//! `Command line option: ...` for argv syntax. See [`ParamError`].

mod cmdline;
mod coerce;
mod conf;
mod constraint;
mod doc;
mod env;
mod error;
mod file;
mod param;
mod value;


pub use coerce::CoerceError;
pub use conf::{AcquireOverrides, Conf, ConfBuilder};
pub use constraint::ConstraintError;
pub use error::ParamError;
pub use param::{DocSpec, Param, ParamSpec};
pub use value::{DictValue, ParamType, Value};
