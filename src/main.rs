use std::io;
use std::io::prelude::*;
use std::iter;
use std::process::ExitCode;

use clap::Parser;
use itertools::Itertools;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use exprcalc::vars::{self, parse_binding};
use exprcalc::{tokenize, Context, EvalError, Evaluator, Span};

/// Evaluates arithmetic expressions with `+ - * /`, parentheses and variables.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Bind a variable, may be given more than once.
    #[arg(short, long = "var", value_name = "NAME=VALUE", value_parser = parse_binding)]
    vars: Vec<(String, f64)>,

    /// Do not predefine pi, e, tau, inf and nan.
    #[arg(long)]
    no_defaults: bool,

    /// Print the token stream instead of evaluating.
    #[arg(long)]
    tokens: bool,

    /// Expression to evaluate. Starts a prompt when omitted.
    expr: Option<String>,
}

fn print_error(line: &str, err: &EvalError) {
    eprintln!("{}", line);

    let Span(begin, end) = err.span();
    let count = |s: Option<&str>| s.map_or(0, |s| s.chars().count());
    let a = count(line.get(..begin));
    let b = a + count(line.get(begin..end));

    let mut msg = String::new();
    (0..a).for_each(|_| msg.push(' '));
    (a..b.max(a + 1)).for_each(|_| msg.push('^'));
    eprintln!("{}", msg);

    eprintln!("error: {}", err);
}

fn execute_line(line: &str, ctx: &Context, show_tokens: bool) -> bool {
    if show_tokens {
        return match tokenize(line) {
            Ok(tokens) => {
                let names = tokens.iter().map(|t| t.to_string());
                println!("{}", names.chain(iter::once("EOF".into())).join("\n"));
                true
            }
            Err(err) => {
                print_error(line, &EvalError::from(err));
                false
            }
        };
    }

    match Evaluator::new(line).with_lookup(ctx).evaluate() {
        Ok(x) => {
            println!(" {:?}", x);
            true
        }
        Err(err) => {
            print_error(line, &err);
            false
        }
    }
}

fn print_vars(ctx: &Context) {
    let bindings = ctx
        .names()
        .into_iter()
        .filter_map(|name| ctx.get(name).map(|x| format!("{} = {:?}", name, x)))
        .join("\n");

    if !bindings.is_empty() {
        println!("{}", bindings);
    }
}

fn repl(ctx: &Context, show_tokens: bool) -> io::Result<()> {
    let exit_cmds = ["exit", "quit", ""];
    let input = io::stdin();
    let mut output = io::stdout();

    loop {
        output.write_all(b">>> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let line = line.trim_end_matches(&['\n', '\r'][..]);

        if exit_cmds.contains(&line.trim()) {
            break;
        }

        if line.trim() == ":vars" {
            print_vars(ctx);
            continue;
        }

        execute_line(line, ctx, show_tokens);
    }

    Ok(())
}

fn main() -> ExitCode {
    // RUST_LOG selects the level, e.g. RUST_LOG=exprcalc=trace
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let base = if args.no_defaults {
        Context::new()
    } else {
        vars::create()
    };

    let mut ctx = Context::with_parent(&base);
    for (name, value) in &args.vars {
        ctx.set(name, *value);
    }

    match &args.expr {
        Some(expr) => {
            if execute_line(expr, &ctx, args.tokens) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        None => match repl(&ctx, args.tokens) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {}", err);
                ExitCode::FAILURE
            }
        },
    }
}
