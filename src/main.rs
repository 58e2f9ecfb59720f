use std::env;
use std::fs;
use std::path::Path;
use std::process;

use qsapy::debug;
use qsapy::{transpile_str, Config, ErrorFormatter, TranspileError};

struct Options {
    input: String,
    output: Option<String>,
    config: Option<String>,
    events: bool,
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {} <input.xml> [output.py] [--config cfg.json] [--events] [--debug|--trace]",
        program
    );
    process::exit(1);
}

fn parse_args(args: &[String]) -> Options {
    let program = args.first().map(String::as_str).unwrap_or("qsapy");
    let mut positional = Vec::new();
    let mut config = None;
    let mut events = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => match iter.next() {
                Some(path) => config = Some(path.clone()),
                None => usage(program),
            },
            "--events" => events = true,
            "--debug" => debug::enable_debug(),
            "--trace" => debug::enable_trace(),
            flag if flag.starts_with("--") => usage(program),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let Some(input) = positional.next() else {
        usage(program)
    };
    let output = positional.next();
    if positional.next().is_some() {
        usage(program);
    }

    Options {
        input,
        output,
        config,
        events,
    }
}

fn fail(error: &TranspileError, filename: &str) -> ! {
    eprintln!("{}", ErrorFormatter::new(error).with_filename(filename).format());
    process::exit(1);
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);

    let config = match &options.config {
        Some(path) => Config::from_file(path).unwrap_or_else(|err| fail(&err, path)),
        None => Config::default(),
    };

    let source = match fs::read_to_string(&options.input) {
        Ok(content) => content,
        Err(err) => fail(&TranspileError::from(err), &options.input),
    };

    let output = transpile_str(&source, &config).unwrap_or_else(|err| fail(&err, &options.input));

    if options.events {
        match serde_json::to_string_pretty(&output.events) {
            Ok(json) => println!("{}", json),
            Err(err) => fail(&TranspileError::from(err), &options.input),
        }
        return;
    }

    let output_file = options.output.clone().unwrap_or_else(|| {
        Path::new(&options.input)
            .with_extension("py")
            .to_string_lossy()
            .into_owned()
    });

    if let Err(err) = fs::write(&output_file, &output.python) {
        fail(&TranspileError::from(err), &output_file);
    }

    if output.diagnostics.has_warnings() {
        eprintln!(
            "{}: {} construct(s) could not be translated, look for '# DEBUG::' markers",
            options.input,
            output.diagnostics.warning_count()
        );
    }
    println!("Successfully transpiled '{}' to '{}'", options.input, output_file);
}
