use std::env;
use std::fs;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use serde::Serialize;

use mono::{compile, render_diagnostic, MonoError};
use mono_http_server::{start_server, Handler, MonoResponse};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(MonoError::Diagnostics) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), MonoError> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_help();
        return Ok(());
    };
    let rest: Vec<String> = args.collect();

    match command.as_str() {
        "-h" | "--help" => {
            print_help();
            Ok(())
        }
        "check" => {
            let Some(path) = rest.first() else {
                print_help();
                return Ok(());
            };
            let source = fs::read_to_string(path)?;
            let outcome = mono::check_source(&source).map_err(|err| report(path, err))?;
            println!("{}", outcome.ty);
            Ok(())
        }
        "run" => {
            let Some(path) = rest.first() else {
                print_help();
                return Ok(());
            };
            let source = fs::read_to_string(path)?;
            let output = compile(&source).map_err(|err| report(path, err))?;
            println!("{}", output.value);
            Ok(())
        }
        "trace" => {
            let Some(path) = rest.first() else {
                print_help();
                return Ok(());
            };
            let source = fs::read_to_string(path)?;
            let output = compile(&source).map_err(|err| report(path, err))?;
            let rendered = serde_json::to_string_pretty(&output)
                .map_err(|err| MonoError::Io(std::io::Error::other(err)))?;
            println!("{rendered}");
            Ok(())
        }
        "serve" => cmd_serve(&rest),
        _ => {
            print_help();
            Err(MonoError::InvalidCommand(command))
        }
    }
}

/// Render syntax and type errors as diagnostics on stderr; pass everything
/// else through untouched.
fn report(path: &str, err: MonoError) -> MonoError {
    match err {
        MonoError::Syntax(err) => {
            eprintln!("{}", render_diagnostic(path, &err.to_diagnostic()));
            MonoError::Diagnostics
        }
        MonoError::Type(err) => {
            eprintln!("{}", render_diagnostic(path, &err.to_diagnostic()));
            MonoError::Diagnostics
        }
        other => other,
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn cmd_serve(args: &[String]) -> Result<(), MonoError> {
    let mut port = 37105u16;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--port" => {
                let Some(value) = iter.next() else {
                    return Err(MonoError::InvalidCommand(
                        "--port expects a value".to_string(),
                    ));
                };
                port = value.parse::<u16>().map_err(|_| {
                    MonoError::InvalidCommand(format!("invalid port '{value}'"))
                })?;
            }
            other => {
                return Err(MonoError::InvalidCommand(format!(
                    "unexpected serve argument {other}"
                )));
            }
        }
    }

    let handler: Handler = Arc::new(|request| {
        Box::pin(async move {
            if request.method != "POST" || request.path != "/compile" {
                return Ok(json_response(
                    404,
                    &ErrorBody {
                        error: "unknown route; POST source to /compile".to_string(),
                    },
                ));
            }
            let Ok(source) = String::from_utf8(request.body) else {
                return Ok(json_response(
                    400,
                    &ErrorBody {
                        error: "request body must be UTF-8 source text".to_string(),
                    },
                ));
            };
            // Each request runs its own checker, recorder and evaluator.
            match compile(&source) {
                Ok(output) => Ok(json_response(200, &output)),
                Err(err) => Ok(json_response(
                    422,
                    &ErrorBody {
                        error: err.to_string(),
                    },
                )),
            }
        })
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let handle = start_server(addr, handler)
        .map_err(|err| MonoError::Io(std::io::Error::other(err)))?;
    println!("listening on http://{addr} (POST /compile)");
    handle
        .wait()
        .map_err(|err| MonoError::Io(std::io::Error::other(err)))
}

fn json_response(status: u16, body: &impl Serialize) -> MonoResponse {
    let body = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    MonoResponse {
        status,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body,
    }
}

fn print_help() {
    println!(
        "mono\n\nUSAGE:\n  mono <COMMAND>\n\nCOMMANDS:\n  check <path>           parse and infer; print the program's type\n  run <path>             parse, infer and evaluate; print the final value\n  trace <path>           print the full inference trace as JSON\n  serve [--port <port>]  expose POST /compile over HTTP (default port 37105)\n\n  -h, --help"
    );
}
