//! # confit demo application
//!
//! A sample CLI tool that shows how to wire [confit](https://docs.rs/confit)
//! into a real application. This is **not** a real app — it exists purely to
//! demonstrate and manually verify confit's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example confit_demo -- --help
//! cargo run --example confit_demo
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature              | How to exercise it                                            |
//! |----------------------|---------------------------------------------------------------|
//! | Declared defaults    | `cargo run --example confit_demo`                             |
//! | Config file          | Create `confit-demo.conf` in cwd with e.g. `COLOR green`      |
//! | Env var override     | `CONFIT_DEMO_COLOR=red cargo run --example confit_demo`       |
//! | CLI override         | `cargo run --example confit_demo -- --color blue`             |
//! | Integer range check  | `cargo run --example confit_demo -- --retries 99`             |
//! | List values          | `cargo run --example confit_demo -- --tags a,b,c`             |
//! | Dictionary values    | `cargo run --example confit_demo -- -b '{ host : h ; port : 1 }'` |
//! | Boolean flag         | `cargo run --example confit_demo -- -q`                       |
//! | Generated help text  | `cargo run --example confit_demo -- --help`                   |

use std::process::ExitCode;

use confit::{Conf, DocSpec, ParamError, ParamSpec, ParamType};

fn build_conf() -> Result<Conf, ParamError> {
    Conf::builder()
        .conf_file_name("confit-demo.conf")
        .env_prefix("CONFIT_DEMO_")
        .allow_unset_values(true)
        .param(
            ParamSpec::new("color")
                .default("yellow")
                .allowed_values(["red", "green", "yellow", "blue", "magenta", "cyan"])
                .doc(
                    DocSpec::new("Color used for the output listing.")
                        .section("Display")
                        .argname("name"),
                ),
        )
        .param(
            ParamSpec::new("quiet")
                .param_type(ParamType::Bool)
                .default(false)
                .doc(DocSpec::new("Suppress the value listing.").section("Display")),
        )
        .param(
            ParamSpec::new("retries")
                .param_type(ParamType::Int)
                .default(3)
                .allowed_range(0, 10)
                .doc(
                    DocSpec::new("How often to retry a failed request.")
                        .section("Network")
                        .argname("count"),
                ),
        )
        .param(
            ParamSpec::new("tags")
                .param_type(ParamType::StrList)
                .default("demo,sample")
                .doc(
                    DocSpec::new("Comma-separated tags attached to every request.")
                        .section("Network")
                        .argname("tags"),
                ),
        )
        .param(
            ParamSpec::new("backend")
                .param_type(ParamType::StrDict)
                .cmd_line(Some('b'), Some("backend"))
                .allowed_keys(["host", "port", "proto"])
                .default_key("host")
                .doc(
                    DocSpec::new(
                        "Backend endpoint settings:\n\
                         * host - the server to talk to\n\
                         * port - its TCP port\n\
                         * proto - http or https",
                    )
                    .section("Network")
                    .argname("spec"),
                ),
        )
        .build()
}

fn run() -> Result<(), ParamError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut conf = build_conf()?;

    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("Usage: confit_demo [options]\n\nOptions:\n\n{}", conf.make_doc(0));
        return Ok(());
    }

    conf.acquire(&args)?;

    if conf.get("quiet")?.and_then(|v| v.as_bool()) == Some(true) {
        return Ok(());
    }
    for (name, value) in conf.items() {
        match value {
            Some(value) => println!("{name} = {value}"),
            None => println!("{name} is unset"),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("confit-demo: {err}");
            ExitCode::FAILURE
        }
    }
}
